//! # Seam Scan Tests
//!
//! Backend call accounting for ranges that straddle a segment boundary.
//!
//! Segments 0 and 1 are on disk, each with real digests at their first and
//! last three slots. Four three-block windows slide across one seam; the
//! seam picks which segments are present on each side.

mod common;

use common::*;
use qc_07_log_bloom_cache::{CallCounts, LogQueryApi, LogQueryService};
use tempfile::TempDir;

fn expected_blocks(seam: u64) -> Vec<u64> {
    seam_windows(seam)
        .into_iter()
        .flat_map(|(from, to)| from..=to)
        .collect()
}

// =============================================================================
// BOTH SIDES CACHED
// =============================================================================

#[test]
fn test_seam_between_two_cached_segments() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(4 * CAPACITY);
    let store = edge_populated_store(dir.path(), &[0, 1]);
    let service = LogQueryService::new(chain.clone(), Some(store));

    let logs = scan_seam_windows(&service, CAPACITY);

    let blocks: Vec<_> = logs.iter().map(|l| l.block_number).collect();
    assert_eq!(blocks, expected_blocks(CAPACITY));
    assert_eq!(
        chain.calls(),
        CallCounts {
            resolve_hash_by_number: 12,
            header_by_hash: 12,
            header_by_number: 0,
            receipts_by_hash: 12,
            body_by_hash: 12,
            is_canonical: 12,
        },
        "Cached candidates resolve by number, then one fetch of each kind"
    );
}

// =============================================================================
// CACHED / UNCACHED
// =============================================================================

#[test]
fn test_seam_between_cached_and_absent_segment() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(4 * CAPACITY);
    let store = edge_populated_store(dir.path(), &[0, 1]);
    let service = LogQueryService::new(chain.clone(), Some(store));

    let logs = scan_seam_windows(&service, 2 * CAPACITY);

    assert_eq!(logs.len(), 12);
    let calls = chain.calls();
    assert_eq!(calls.resolve_hash_by_number, 6, "Only the cached half resolves by number");
    assert_eq!(calls.header_by_number, 6, "Only the absent half fetches headers by number");
    assert_eq!(calls.header_by_hash, 6, "Header-path candidates already hold their header");
    assert_eq!(calls.is_canonical, 12);
    assert_eq!(calls.receipts_by_hash, 12);
    assert_eq!(calls.body_by_hash, 12);
}

// =============================================================================
// BOTH SIDES ABSENT
// =============================================================================

#[test]
fn test_seam_between_two_absent_segments() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(4 * CAPACITY);
    let store = edge_populated_store(dir.path(), &[0, 1]);
    let service = LogQueryService::new(chain.clone(), Some(store));

    let logs = scan_seam_windows(&service, 3 * CAPACITY);

    let blocks: Vec<_> = logs.iter().map(|l| l.block_number).collect();
    assert_eq!(blocks, expected_blocks(3 * CAPACITY));
    assert_eq!(
        chain.calls(),
        CallCounts {
            resolve_hash_by_number: 0,
            header_by_hash: 0,
            header_by_number: 12,
            receipts_by_hash: 12,
            body_by_hash: 12,
            is_canonical: 12,
        }
    );
}

// =============================================================================
// SINGLE SEGMENT
// =============================================================================

#[test]
fn test_fully_matching_segment_fetches_once_per_block() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(CAPACITY);
    let store = edge_populated_store(dir.path(), &[0]);
    let service = LogQueryService::new(chain.clone(), Some(store));

    let logs = service.matching_logs(0, 2, &query_a()).unwrap();

    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].data, 0u64.to_be_bytes().to_vec());
    let calls = chain.calls();
    assert_eq!(calls.is_canonical, 3);
    assert_eq!(calls.receipts_by_hash, 3);
    assert_eq!(calls.body_by_hash, 3);
}

#[test]
fn test_zero_slots_are_trusted_as_empty() {
    let dir = TempDir::new().unwrap();
    let chain = chain_of(CAPACITY);
    let store = edge_populated_store(dir.path(), &[0]);
    let service = LogQueryService::new(chain.clone(), Some(store));

    // Blocks 3..=96 do emit logs, but their cached slots are zero
    let logs = service.matching_logs(3, 96, &query_a()).unwrap();

    assert!(logs.is_empty());
    assert_eq!(chain.calls().total(), 0, "Zero digests never reach the chain");
}
