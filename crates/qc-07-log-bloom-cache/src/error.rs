//! Error types for the log bloom cache
//!
//! Expected outcomes (segment absent, digest not matching, candidate not
//! canonical) are never errors. Everything here is an integrity fault and
//! reaches the caller unmodified.

use std::path::PathBuf;

use shared_types::{BlockNumber, Hash};
use thiserror::Error;

use crate::domain::SegmentIndex;

/// Errors returned by the query facade
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Cache integrity fault: {0}")]
    Cache(#[from] CacheError),

    #[error("Chain inconsistency: {0}")]
    Chain(#[from] ChainError),

    #[error("Query cancelled before block {block}")]
    Cancelled { block: BlockNumber },
}

/// Segment store faults
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Segment {segment} is truncated: slot {slot} overlaps a partial tail ({file_len} bytes)")]
    Truncated {
        segment: SegmentIndex,
        slot: u64,
        file_len: u64,
    },

    #[error("Segment {segment} does not exist")]
    SegmentMissing { segment: SegmentIndex },

    #[error("Segment {segment} holds {capacity} slots, got {count} digests")]
    SegmentOverflow {
        segment: SegmentIndex,
        capacity: u64,
        count: u64,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Caching is disabled")]
    Disabled,
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Chain-storage backend integrity faults
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Header missing for canonical block {}", hex::encode(.hash))]
    MissingHeader { hash: Hash },

    #[error("Receipts missing for canonical block {}", hex::encode(.hash))]
    MissingReceipts { hash: Hash },

    #[error("Body missing for canonical block {}", hex::encode(.hash))]
    MissingBody { hash: Hash },

    #[error("Header for block {expected} reports number {actual}")]
    HeaderNumberMismatch {
        expected: BlockNumber,
        actual: BlockNumber,
    },

    #[error("Block {block} has {receipts} receipts for {transactions} transactions")]
    ReceiptCountMismatch {
        block: BlockNumber,
        receipts: usize,
        transactions: usize,
    },
}

/// Errors raised by the cache producer
#[derive(Debug, Error)]
pub enum CacherError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid segment capacity: {capacity} (must be > 0)")]
    InvalidCapacity { capacity: u64 },

    #[error("Segment capacity {capacity} overflows u64 byte offsets")]
    CapacityOverflow { capacity: u64 },
}
