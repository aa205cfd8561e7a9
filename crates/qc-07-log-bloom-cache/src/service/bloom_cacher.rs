//! # Bloom Cacher
//!
//! Fills segment slots from header `logs_bloom` fields. The header bloom
//! already uses the digest layout, so slots are copied verbatim.
//!
//! When and how often to run it is up to the embedder.

use std::sync::Arc;

use shared_types::{BlockHeader, BlockNumber};
use tracing::{debug, info};

use crate::adapters::FileSegmentStore;
use crate::domain::{BloomDigest, CacheConfig, SegmentIndex};
use crate::error::{CacheError, CacherError, ChainError};
use crate::ports::{ChainReader, SegmentStore};

/// Outcome of a backfill run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Slots written.
    pub slots_written: u64,
    /// Highest block cached, if any.
    pub last_block: Option<BlockNumber>,
}

impl CacheReport {
    fn record(&mut self, block: BlockNumber) {
        self.slots_written += 1;
        self.last_block = Some(block);
    }
}

/// Segment producer over one chain and one store.
pub struct BloomCacher<C: ChainReader, S: SegmentStore> {
    chain: Arc<C>,
    store: Arc<S>,
}

impl<C: ChainReader, S: SegmentStore> BloomCacher<C, S> {
    pub fn new(chain: Arc<C>, store: Arc<S>) -> Self {
        Self { chain, store }
    }

    /// Write `header`'s bloom into its slot.
    pub fn cache_block(&self, header: &BlockHeader) -> Result<(), CacheError> {
        self.store
            .write_digest(header.number, &BloomDigest::from_bytes(header.logs_bloom))
    }

    /// Backfill slots for `[from, to]`, stopping at the chain head.
    pub fn cache_range(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<CacheReport, CacherError> {
        let mut report = CacheReport::default();
        if to < from {
            return Ok(report);
        }

        for block in from..=to {
            let Some(header) = self.header(block)? else {
                debug!(block, "Reached chain head");
                break;
            };
            self.cache_block(&header)?;
            report.record(block);
        }

        info!(
            from,
            to,
            slots = report.slots_written,
            last_block = ?report.last_block,
            "Cached log blooms"
        );
        Ok(report)
    }

    /// Backfill one whole segment with a single bulk write.
    ///
    /// A segment the chain has not reached yet is left untouched; one the
    /// chain ends inside is written up to the head.
    pub fn cache_segment(&self, segment: SegmentIndex) -> Result<CacheReport, CacherError> {
        let layout = self.store.layout();
        let mut report = CacheReport::default();
        let mut digests = Vec::new();

        for block in layout.segment_blocks(segment) {
            let Some(header) = self.header(block)? else {
                break;
            };
            digests.push(BloomDigest::from_bytes(header.logs_bloom));
            report.record(block);
        }

        if digests.is_empty() {
            debug!(segment, "Segment beyond chain head, nothing to cache");
            return Ok(report);
        }
        self.store.write_segment(segment, &digests)?;

        info!(
            segment,
            slots = report.slots_written,
            complete = report.slots_written == layout.capacity(),
            "Cached segment"
        );
        Ok(report)
    }

    fn header(&self, block: BlockNumber) -> Result<Option<BlockHeader>, ChainError> {
        match self.chain.header_by_number(block) {
            Some(header) if header.number != block => Err(ChainError::HeaderNumberMismatch {
                expected: block,
                actual: header.number,
            }),
            header => Ok(header),
        }
    }
}

impl<C: ChainReader> BloomCacher<C, FileSegmentStore> {
    /// Producer writing into the configured directory.
    ///
    /// Fails with `CacheError::Disabled` when `config` names no directory.
    pub fn from_config(chain: Arc<C>, config: &CacheConfig) -> Result<Self, CacherError> {
        let store = FileSegmentStore::from_config(config)?.ok_or(CacheError::Disabled)?;
        Ok(Self::new(chain, Arc::new(store)))
    }
}
