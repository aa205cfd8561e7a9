//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use qc_07_log_bloom_cache::{
    BloomDigest, FileSegmentStore, InMemoryChain, LogQuery, LogQueryApi, MatchedLog,
    SegmentLayout, SegmentStore,
};
use shared_types::{Address, BlockNumber, Log, Topic};

/// Blocks per segment used by every fixture.
pub const CAPACITY: u64 = 100;

pub const ADDR_A: Address = [0xA1; 20];
pub const ADDR_B: Address = [0xB2; 20];
pub const TOPIC: Topic = [0x07; 32];

/// Log from `ADDR_A` tagged with its block number.
pub fn log_a(block: BlockNumber) -> Log {
    Log::new(ADDR_A, vec![TOPIC], block.to_be_bytes().to_vec())
}

/// Chain of `len` blocks, each with one transaction emitting one log from
/// `ADDR_A`.
pub fn chain_of(len: u64) -> Arc<InMemoryChain> {
    let chain = InMemoryChain::new();
    for n in 0..len {
        chain.append_block_with_logs(vec![vec![log_a(n)]]);
    }
    Arc::new(chain)
}

pub fn query_a() -> LogQuery {
    LogQuery::for_addresses(vec![ADDR_A])
}

/// Segment contents with the `ADDR_A` digest at the first three and last
/// three slots and zero digests in between.
pub fn edge_populated_segment() -> Vec<BloomDigest> {
    let digest = BloomDigest::of(&ADDR_A);
    (0..CAPACITY)
        .map(|slot| {
            if slot < 3 || slot >= CAPACITY - 3 {
                digest
            } else {
                BloomDigest::empty()
            }
        })
        .collect()
}

/// File store under `root` holding `segments`, each edge-populated.
pub fn edge_populated_store(root: &Path, segments: &[u64]) -> Arc<FileSegmentStore> {
    let store = FileSegmentStore::new(root, SegmentLayout::new(CAPACITY).unwrap());
    let contents = edge_populated_segment();
    for &segment in segments {
        store
            .write_segment(segment, &contents)
            .expect("write fixture segment");
    }
    Arc::new(store)
}

/// The four three-block windows sliding across `seam`, in order.
pub fn seam_windows(seam: BlockNumber) -> [(BlockNumber, BlockNumber); 4] {
    [
        (seam - 3, seam - 1),
        (seam - 2, seam),
        (seam - 1, seam + 1),
        (seam, seam + 2),
    ]
}

/// Run every seam window query and concatenate the results.
pub fn scan_seam_windows(service: &impl LogQueryApi, seam: BlockNumber) -> Vec<MatchedLog> {
    seam_windows(seam)
        .into_iter()
        .flat_map(|(from, to)| {
            service
                .matching_logs(from, to, &query_a())
                .expect("window query")
        })
        .collect()
}
