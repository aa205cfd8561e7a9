//! # QC-07 Log Bloom Cache
//!
//! Segmented logs-bloom cache and range-scan engine for log queries over
//! chain history.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `BloomDigest`: 2048-bit logs bloom
//!   - `LogQuery`: Address/topic filter with bloom pre-filter and exact match
//!   - `SegmentLayout`: Block to segment/slot addressing, seam splitting
//!   - `CacheConfig`: Configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `LogQueryApi`: Driving port (inbound API)
//!   - `ChainReader`: Driven port (chain storage backend)
//!   - `SegmentStore`: Driven port (digest segments)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `RangeScanner`: Candidate blocks per sub-range, cached or not
//!   - `LogExtractor`: Canonicality check and exact log extraction
//!   - `LogQueryService`: Implements `LogQueryApi`
//!   - `BloomCacher`: Fills segments from header blooms
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `FileSegmentStore`: `logBloom-{n}.index` files, flat 256-byte slots
//!   - `InMemorySegmentStore`, `InMemoryChain`: in-memory backends
//!
//! ## Invariants
//!
//! - **No false negatives**: a log inserted into a digest always passes the
//!   pre-filter, so a cached scan returns exactly what an uncached one does.
//! - **Seam independence**: each per-segment piece of a range is served from
//!   its own segment or from headers, never both.
//! - **No torn reads**: a reader sees a whole slot or none of it.
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qc_07_log_bloom_cache::{CacheConfigBuilder, LogQuery, LogQueryApi, LogQueryService};
//!
//! let config = CacheConfigBuilder::new()
//!     .cache_dir("/data/caches")
//!     .blocks_per_segment(100_000)
//!     .build()?;
//! let service = LogQueryService::from_config(Arc::new(chain), &config)?;
//!
//! let query = LogQuery::for_addresses(vec![token_address]);
//! for log in service.matching_logs(17_000_000, 17_100_000, &query)? {
//!     println!("{} #{}", log.block_number, log.log_index);
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{CallCounts, FileSegmentStore, InMemoryChain, InMemorySegmentStore};
pub use domain::{
    BloomDigest, CacheConfig, CacheConfigBuilder, CancellationFlag, Candidate, CandidateOutcome,
    LogQuery, MatchedLog, SegmentLayout,
};
pub use error::{CacheError, CacherError, ChainError, ConfigError, QueryError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{ChainReader, LogQueryApi, SegmentStore};
pub use service::{BloomCacher, CacheReport, LogExtractor, LogQueryService, RangeScanner};
