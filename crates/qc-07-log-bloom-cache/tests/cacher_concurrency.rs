//! # Producer and Concurrency Tests
//!
//! Backfilled segments serve queries through the cached path, and readers
//! running alongside a writer never observe a torn slot.

mod common;

use std::sync::Arc;

use common::*;
use qc_07_log_bloom_cache::{
    BloomCacher, FileSegmentStore, LogQueryApi, LogQueryService, Metrics, SegmentLayout,
};
use tempfile::TempDir;

#[test]
fn test_backfill_then_cached_query() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(2 * CAPACITY);
    let store = Arc::new(FileSegmentStore::new(dir.path(), SegmentLayout::new(CAPACITY).unwrap()));
    let cacher = BloomCacher::new(chain.clone(), store.clone());

    let first = cacher.cache_segment(0).unwrap();
    let second = cacher.cache_segment(1).unwrap();
    assert_eq!(first.slots_written, CAPACITY);
    assert_eq!(second.last_block, Some(2 * CAPACITY - 1));
    assert_eq!(store.segments().unwrap(), vec![0, 1]);

    chain.reset_calls();
    let metrics = Arc::new(Metrics::new());
    let service = LogQueryService::with_metrics(chain.clone(), Some(store), metrics.clone());
    let logs = service.matching_logs(0, 2 * CAPACITY - 1, &query_a()).unwrap();

    assert_eq!(logs.len() as u64, 2 * CAPACITY);
    assert_eq!(chain.calls().header_by_number, 0, "Fully served from segments");
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.cached_ranges, 2);
    assert_eq!(snapshot.digests_read, 2 * CAPACITY);
}

#[test]
fn test_segment_files_use_slot_layout() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(CAPACITY + 3);
    let store = Arc::new(FileSegmentStore::new(dir.path(), SegmentLayout::new(CAPACITY).unwrap()));

    BloomCacher::new(chain, store.clone())
        .cache_range(0, CAPACITY + 2)
        .unwrap();

    let full = std::fs::metadata(dir.path().join("logBloom-0.index")).unwrap();
    let partial = std::fs::metadata(dir.path().join("logBloom-1.index")).unwrap();
    assert_eq!(full.len(), CAPACITY * 256);
    assert_eq!(partial.len(), 3 * 256);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_torn_slots_while_writer_appends() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(3 * CAPACITY);
    let store = Arc::new(FileSegmentStore::new(dir.path(), SegmentLayout::new(CAPACITY).unwrap()));
    let service = Arc::new(LogQueryService::new(chain.clone(), Some(store.clone())));
    let expected = LogQueryService::without_cache(chain.clone())
        .matching_logs(0, 3 * CAPACITY - 1, &query_a())
        .unwrap();

    let writer = {
        let cacher = BloomCacher::new(chain.clone(), store.clone());
        tokio::task::spawn_blocking(move || {
            for block in 0..3 * CAPACITY {
                cacher.cache_range(block, block).expect("cache block");
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::task::spawn_blocking(move || {
                (0..5)
                    .map(|_| service.matching_logs(0, 3 * CAPACITY - 1, &query_a()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        for result in reader.await.unwrap() {
            let logs = result.expect("No integrity fault while the writer runs");
            assert_eq!(logs, expected);
        }
    }

    let after = service.matching_logs(0, 3 * CAPACITY - 1, &query_a()).unwrap();
    assert_eq!(after, expected);
}
