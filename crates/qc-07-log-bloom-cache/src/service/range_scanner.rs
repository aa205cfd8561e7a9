//! # Range Scanner
//!
//! Turns a block range into bloom-matching candidates, in ascending block
//! order.
//!
//! The range is split at every segment seam and each piece picks its own
//! path:
//! - segment present: digest from the slot, hash by number on a match
//! - segment absent: header by number, digest and hash from the header
//!
//! A slot past the written tail of a present segment hands the rest of
//! that piece to the header path.

use tracing::{debug, trace, warn};

use shared_types::BlockNumber;

use crate::domain::{CancellationFlag, Candidate, LogQuery, SegmentLayout, SegmentRange};
use crate::error::QueryError;
use crate::metrics::MetricsRecorder;
use crate::ports::{ChainReader, SegmentStore};

/// Whether the scan may continue after a sub-range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// The chain ends inside the sub-range.
    Head,
}

/// Candidate producer over one chain and an optional segment store.
pub struct RangeScanner<'a, C: ChainReader, S: SegmentStore> {
    chain: &'a C,
    store: Option<&'a S>,
    metrics: &'a dyn MetricsRecorder,
}

impl<'a, C: ChainReader, S: SegmentStore> RangeScanner<'a, C, S> {
    /// Scanner over `chain`; `store = None` serves every block from headers.
    pub fn new(chain: &'a C, store: Option<&'a S>, metrics: &'a dyn MetricsRecorder) -> Self {
        Self {
            chain,
            store,
            metrics,
        }
    }

    /// Collect every candidate in `[from, to]`.
    pub fn scan(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
        cancel: &CancellationFlag,
    ) -> Result<Vec<Candidate>, QueryError> {
        let mut candidates = Vec::new();
        self.scan_with(from, to, query, cancel, |candidate| {
            candidates.push(candidate);
            Ok(())
        })?;
        Ok(candidates)
    }

    /// Feed every candidate in `[from, to]` to `sink` as soon as it is found.
    ///
    /// Stops early at the chain head. An error from `sink` aborts the scan.
    pub fn scan_with<F>(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
        cancel: &CancellationFlag,
        mut sink: F,
    ) -> Result<(), QueryError>
    where
        F: FnMut(Candidate) -> Result<(), QueryError>,
    {
        if to < from {
            return Ok(());
        }

        let Some(store) = self.store else {
            self.metrics.record_range(false);
            debug!(from, to, "Caching disabled, scanning headers");
            self.scan_headers(from, to, query, cancel, &mut sink)?;
            return Ok(());
        };

        let layout = store.layout();
        for range in layout.split_range(from, to) {
            let cached = store.segment_exists(range.segment);
            self.metrics.record_range(cached);
            debug!(
                segment = range.segment,
                from = range.from,
                to = range.to,
                cached,
                "Scanning sub-range"
            );

            let flow = if cached {
                self.scan_segment(store, layout, range, query, cancel, &mut sink)?
            } else {
                self.scan_headers(range.from, range.to, query, cancel, &mut sink)?
            };
            if flow == Flow::Head {
                break;
            }
        }
        Ok(())
    }

    fn scan_segment<F>(
        &self,
        store: &S,
        layout: SegmentLayout,
        range: SegmentRange,
        query: &LogQuery,
        cancel: &CancellationFlag,
        sink: &mut F,
    ) -> Result<Flow, QueryError>
    where
        F: FnMut(Candidate) -> Result<(), QueryError>,
    {
        for block in range.blocks() {
            self.checkpoint(cancel, block)?;

            let digest = match store.read_digest(block) {
                Ok(Some(digest)) => digest,
                Ok(None) => {
                    debug!(
                        segment = range.segment,
                        slot = layout.slot(block),
                        "Segment tail not written yet, scanning headers for the rest"
                    );
                    return self.scan_headers(block, range.to, query, cancel, sink);
                }
                Err(e) => {
                    warn!(segment = range.segment, block, error = %e, "Segment read failed");
                    return Err(e.into());
                }
            };
            self.metrics.record_digest_read();

            if !query.matches(&digest) {
                continue;
            }
            let Some(hash) = self.chain.resolve_hash_by_number(block) else {
                debug!(block, "No canonical block, stopping at chain head");
                return Ok(Flow::Head);
            };
            trace!(block, hash = %hex::encode(hash), "Cached candidate");
            sink(Candidate::from_cache(block, hash, digest))?;
        }
        Ok(Flow::Continue)
    }

    fn scan_headers<F>(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
        cancel: &CancellationFlag,
        sink: &mut F,
    ) -> Result<Flow, QueryError>
    where
        F: FnMut(Candidate) -> Result<(), QueryError>,
    {
        for block in from..=to {
            self.checkpoint(cancel, block)?;

            let Some(header) = self.chain.header_by_number(block) else {
                debug!(block, "No canonical header, stopping at chain head");
                return Ok(Flow::Head);
            };
            self.metrics.record_header_scanned();

            let candidate = Candidate::from_header(header);
            if query.matches(&candidate.digest) {
                trace!(block, hash = %hex::encode(candidate.hash), "Header candidate");
                sink(candidate)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn checkpoint(&self, cancel: &CancellationFlag, block: BlockNumber) -> Result<(), QueryError> {
        if cancel.is_cancelled() {
            self.metrics.record_cancelled();
            debug!(block, "Scan cancelled");
            return Err(QueryError::Cancelled { block });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryChain, InMemorySegmentStore};
    use crate::domain::{BloomDigest, CandidateSource};
    use crate::error::CacheError;
    use crate::metrics::{Metrics, NoOpMetrics};
    use shared_types::Log;

    const ADDR: [u8; 20] = [0xAA; 20];

    /// Chain of `len` blocks where every block in `hits` carries one log from `ADDR`.
    fn chain_with_hits(len: u64, hits: &[u64]) -> InMemoryChain {
        let chain = InMemoryChain::new();
        for n in 0..len {
            if hits.contains(&n) {
                chain.append_block_with_logs(vec![vec![Log::new(ADDR, vec![], vec![])]]);
            } else {
                chain.append_block(Vec::new(), Vec::new());
            }
        }
        chain
    }

    /// Cache every block of `segment` from the chain's headers.
    fn cache_segment(chain: &InMemoryChain, store: &InMemorySegmentStore, segment: u64) {
        for block in store.layout().segment_blocks(segment) {
            let header = chain.header_by_number(block).unwrap();
            store
                .write_digest(block, &BloomDigest::from_bytes(header.logs_bloom))
                .unwrap();
        }
        chain.reset_calls();
    }

    fn numbers(candidates: &[Candidate]) -> Vec<u64> {
        candidates.iter().map(|c| c.block_number).collect()
    }

    #[test]
    fn test_uncached_scan_uses_headers_only() {
        let chain = chain_with_hits(20, &[3, 7]);
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::<_, InMemorySegmentStore>::new(&chain, None, &NoOpMetrics);

        let candidates = scanner.scan(0, 19, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![3, 7]);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Header));
        let calls = chain.calls();
        assert_eq!(calls.header_by_number, 20);
        assert_eq!(calls.resolve_hash_by_number, 0);
    }

    #[test]
    fn test_cached_scan_resolves_only_matches() {
        let chain = chain_with_hits(10, &[2, 8]);
        let store = InMemorySegmentStore::new(SegmentLayout::new(10).unwrap());
        cache_segment(&chain, &store, 0);
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::new(&chain, Some(&store), &NoOpMetrics);

        let candidates = scanner.scan(0, 9, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![2, 8]);
        assert_eq!(candidates[0].hash, chain.hash_at(2).unwrap());
        assert!(candidates.iter().all(|c| c.header.is_none()));
        let calls = chain.calls();
        assert_eq!(calls.resolve_hash_by_number, 2);
        assert_eq!(calls.header_by_number, 0);
    }

    #[test]
    fn test_seam_with_mixed_coverage() {
        let chain = chain_with_hits(20, &[8, 9, 10, 11]);
        let store = InMemorySegmentStore::new(SegmentLayout::new(10).unwrap());
        cache_segment(&chain, &store, 0);
        let query = LogQuery::for_addresses(vec![ADDR]);
        let metrics = Metrics::new();
        let scanner = RangeScanner::new(&chain, Some(&store), &metrics);

        let candidates = scanner.scan(8, 11, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![8, 9, 10, 11]);
        let calls = chain.calls();
        assert_eq!(calls.resolve_hash_by_number, 2, "Cached half resolves by number");
        assert_eq!(calls.header_by_number, 2, "Uncached half fetches headers");
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cached_ranges, 1);
        assert_eq!(snapshot.uncached_ranges, 1);
    }

    #[test]
    fn test_unwritten_tail_falls_back_to_headers() {
        let chain = chain_with_hits(10, &[1, 6]);
        let store = InMemorySegmentStore::new(SegmentLayout::new(10).unwrap());
        for block in 0..4 {
            let header = chain.header_by_number(block).unwrap();
            store
                .write_digest(block, &BloomDigest::from_bytes(header.logs_bloom))
                .unwrap();
        }
        chain.reset_calls();
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::new(&chain, Some(&store), &NoOpMetrics);

        let candidates = scanner.scan(0, 9, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![1, 6]);
        assert_eq!(candidates[0].source, CandidateSource::Cache);
        assert_eq!(candidates[1].source, CandidateSource::Header);
        assert_eq!(chain.calls().header_by_number, 6, "Blocks 4..=9 served by headers");
    }

    #[test]
    fn test_stops_at_chain_head() {
        let chain = chain_with_hits(5, &[4]);
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::<_, InMemorySegmentStore>::new(&chain, None, &NoOpMetrics);

        let candidates = scanner.scan(0, 1_000, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![4]);
        assert_eq!(chain.calls().header_by_number, 6, "One lookup past the head");
    }

    #[test]
    fn test_cached_scan_stops_at_chain_head() {
        let chain = chain_with_hits(4, &[]);
        let store = InMemorySegmentStore::new(SegmentLayout::new(10).unwrap());
        for block in 0..10 {
            store.write_digest(block, &BloomDigest::of(&ADDR)).unwrap();
        }
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::new(&chain, Some(&store), &NoOpMetrics);

        let candidates = scanner.scan(0, 25, &query, &CancellationFlag::new()).unwrap();

        assert_eq!(numbers(&candidates), vec![0, 1, 2, 3]);
        let calls = chain.calls();
        assert_eq!(calls.resolve_hash_by_number, 5);
        assert_eq!(calls.header_by_number, 0, "Later segments are never reached");
    }

    #[test]
    fn test_torn_slot_is_error() {
        let chain = chain_with_hits(10, &[]);
        let store = InMemorySegmentStore::new(SegmentLayout::new(10).unwrap());
        store.put_raw_segment(0, vec![0u8; 256 * 2 + 10]);
        let scanner = RangeScanner::new(&chain, Some(&store), &NoOpMetrics);

        let result = scanner.scan(0, 9, &LogQuery::any(), &CancellationFlag::new());

        assert!(matches!(
            result,
            Err(QueryError::Cache(CacheError::Truncated { slot: 2, .. }))
        ));
    }

    #[test]
    fn test_cancelled_before_first_block() {
        let chain = chain_with_hits(10, &[]);
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let metrics = Metrics::new();
        let scanner = RangeScanner::<_, InMemorySegmentStore>::new(&chain, None, &metrics);

        let result = scanner.scan(3, 9, &LogQuery::any(), &cancel);

        assert!(matches!(result, Err(QueryError::Cancelled { block: 3 })));
        assert_eq!(chain.calls().total(), 0);
        assert_eq!(metrics.snapshot().queries_cancelled, 1);
    }

    #[test]
    fn test_sink_error_aborts_scan() {
        let chain = chain_with_hits(10, &[1, 2, 3]);
        let query = LogQuery::for_addresses(vec![ADDR]);
        let scanner = RangeScanner::<_, InMemorySegmentStore>::new(&chain, None, &NoOpMetrics);
        let mut seen = 0;

        let result = scanner.scan_with(0, 9, &query, &CancellationFlag::new(), |_| {
            seen += 1;
            Err(QueryError::Cancelled { block: 1 })
        });

        assert!(result.is_err());
        assert_eq!(seen, 1);
        assert_eq!(chain.calls().header_by_number, 2);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let chain = chain_with_hits(10, &[]);
        let scanner = RangeScanner::<_, InMemorySegmentStore>::new(&chain, None, &NoOpMetrics);

        let candidates = scanner
            .scan(5, 4, &LogQuery::any(), &CancellationFlag::new())
            .unwrap();

        assert!(candidates.is_empty());
        assert_eq!(chain.calls().total(), 0);
    }
}
