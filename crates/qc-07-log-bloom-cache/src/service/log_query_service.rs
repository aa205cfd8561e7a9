//! Log Query Service
//!
//! Implements `LogQueryApi` by streaming range-scan candidates straight
//! into the extractor, so each block is verified as soon as it is found.

use std::sync::Arc;

use shared_types::{BlockNumber, Hash};
use tracing::debug;

use crate::adapters::FileSegmentStore;
use crate::domain::{CacheConfig, CancellationFlag, CandidateOutcome, LogQuery, MatchedLog};
use crate::error::{ConfigError, QueryError};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{ChainReader, LogQueryApi, SegmentStore};

use super::log_extractor::LogExtractor;
use super::range_scanner::RangeScanner;

/// Query facade over a chain backend and an optional segment store.
///
/// Without a store every block is served from headers; results are the
/// same either way.
pub struct LogQueryService<C: ChainReader, S: SegmentStore = FileSegmentStore> {
    chain: Arc<C>,
    store: Option<Arc<S>>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<C: ChainReader, S: SegmentStore> LogQueryService<C, S> {
    /// Create a service; `store = None` disables caching.
    pub fn new(chain: Arc<C>, store: Option<Arc<S>>) -> Self {
        Self::with_metrics(chain, store, Arc::new(NoOpMetrics))
    }

    /// Create a service recording into `metrics`.
    pub fn with_metrics(
        chain: Arc<C>,
        store: Option<Arc<S>>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            chain,
            store,
            metrics,
        }
    }

    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    pub fn store(&self) -> Option<&Arc<S>> {
        self.store.as_ref()
    }

    /// Whether a segment store is configured.
    pub fn caching_enabled(&self) -> bool {
        self.store.is_some()
    }
}

impl<C: ChainReader> LogQueryService<C, FileSegmentStore> {
    /// Service with caching disabled.
    pub fn without_cache(chain: Arc<C>) -> Self {
        Self::new(chain, None)
    }

    /// Wire a `FileSegmentStore` from `config`, or disable caching when it
    /// names no directory.
    pub fn from_config(chain: Arc<C>, config: &CacheConfig) -> Result<Self, ConfigError> {
        let store = FileSegmentStore::from_config(config)?.map(Arc::new);
        debug!(
            cache_dir = ?config.cache_dir,
            blocks_per_segment = config.blocks_per_segment,
            "Log query service configured"
        );
        Ok(Self::new(chain, store))
    }
}

impl<C: ChainReader, S: SegmentStore> LogQueryApi for LogQueryService<C, S> {
    fn matching_logs(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError> {
        self.matching_logs_cancellable(from, to, query, &CancellationFlag::new())
    }

    fn matching_logs_cancellable(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
        cancel: &CancellationFlag,
    ) -> Result<Vec<MatchedLog>, QueryError> {
        if to < from {
            return Ok(Vec::new());
        }

        let scanner = RangeScanner::new(
            self.chain.as_ref(),
            self.store.as_deref(),
            self.metrics.as_ref(),
        );
        let extractor = LogExtractor::new(self.chain.as_ref());

        let mut logs = Vec::new();
        scanner.scan_with(from, to, query, cancel, |candidate| {
            let outcome = extractor.extract(candidate, query)?;
            let discarded = matches!(outcome, CandidateOutcome::Discarded);
            let matched = outcome.into_logs();
            self.metrics.record_candidate(discarded, matched.len());
            logs.extend(matched);
            Ok(())
        })?;

        debug!(from, to, logs = logs.len(), "Log query complete");
        Ok(logs)
    }

    fn matching_logs_for_block(
        &self,
        hash: &Hash,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError> {
        LogExtractor::new(self.chain.as_ref()).extract_block(hash, query)
    }
}
