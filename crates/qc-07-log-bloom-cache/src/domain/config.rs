//! Cache configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use qc_07_log_bloom_cache::domain::CacheConfigBuilder;
//!
//! let config = CacheConfigBuilder::new()
//!     .cache_dir("/data/caches")
//!     .blocks_per_segment(100_000)
//!     .build()
//!     .expect("Valid config");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::segment::SegmentLayout;
use crate::error::ConfigError;

/// Default number of blocks per segment file.
pub const DEFAULT_BLOCKS_PER_SEGMENT: u64 = 100_000;

/// Log bloom cache configuration
///
/// `cache_dir = None` disables the cache: every block is served from
/// headers fetched by number. That mode is slower but returns the same
/// results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory holding the segment files.
    pub cache_dir: Option<PathBuf>,
    /// Blocks per segment. Not persisted; must not change between runs
    /// over the same directory.
    pub blocks_per_segment: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            blocks_per_segment: DEFAULT_BLOCKS_PER_SEGMENT,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with validation
    pub fn new(cache_dir: Option<PathBuf>, blocks_per_segment: u64) -> Result<Self, ConfigError> {
        let config = Self {
            cache_dir,
            blocks_per_segment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate segment capacity bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout().map(|_| ())
    }

    /// Whether a cache directory is configured.
    pub fn caching_enabled(&self) -> bool {
        self.cache_dir.is_some()
    }

    /// Addressing derived from the capacity.
    pub fn layout(&self) -> Result<SegmentLayout, ConfigError> {
        SegmentLayout::new(self.blocks_per_segment)
    }

    /// Builder-style method to set the cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Builder-style method to set the segment capacity
    pub fn with_blocks_per_segment(mut self, capacity: u64) -> Self {
        self.blocks_per_segment = capacity;
        self
    }
}

/// Builder for CacheConfig with validation
#[derive(Default)]
pub struct CacheConfigBuilder {
    cache_dir: Option<PathBuf>,
    blocks_per_segment: Option<u64>,
}

impl CacheConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment root directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set blocks per segment
    pub fn blocks_per_segment(mut self, capacity: u64) -> Self {
        self.blocks_per_segment = Some(capacity);
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<CacheConfig, ConfigError> {
        CacheConfig::new(
            self.cache_dir,
            self.blocks_per_segment.unwrap_or(DEFAULT_BLOCKS_PER_SEGMENT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_disables_cache() {
        let config = CacheConfig::default();

        assert!(!config.caching_enabled());
        assert_eq!(config.blocks_per_segment, DEFAULT_BLOCKS_PER_SEGMENT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = CacheConfigBuilder::new()
            .cache_dir("/tmp/blooms")
            .blocks_per_segment(64)
            .build()
            .expect("Valid config");

        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/blooms")));
        assert_eq!(config.layout().unwrap().capacity(), 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = CacheConfigBuilder::new().blocks_per_segment(0).build();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_overflowing_capacity_rejected() {
        let result = CacheConfig::new(None, u64::MAX / 2);

        assert!(matches!(result, Err(ConfigError::CapacityOverflow { .. })));
    }

    #[test]
    fn test_unvalidated_config_yields_no_layout() {
        let config = CacheConfig::default()
            .with_cache_dir("/tmp/blooms")
            .with_blocks_per_segment(0);

        assert!(matches!(
            config.layout(),
            Err(ConfigError::InvalidCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{ "cache_dir": "/var/cache" }"#).expect("parse");

        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache")));
        assert_eq!(config.blocks_per_segment, DEFAULT_BLOCKS_PER_SEGMENT);
    }
}
