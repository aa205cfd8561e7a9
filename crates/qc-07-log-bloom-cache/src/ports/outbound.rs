//! Outbound Ports (Driven Ports)
//!
//! Dependencies the log bloom cache needs from the rest of the node: the
//! chain-storage backend and the segment store.

use shared_types::{BlockBody, BlockHeader, BlockNumber, Hash, TransactionReceipt};

use crate::domain::{BloomDigest, SegmentIndex, SegmentLayout};
use crate::error::CacheError;

/// Read access to the local chain (Driven Port)
///
/// Treated as synchronous and side-effect free. Every method answers
/// `None` for data the backend does not have; deciding whether that is a
/// fault is the caller's job.
pub trait ChainReader: Send + Sync {
    /// Canonical hash at `number`, or `None` past the chain head.
    fn resolve_hash_by_number(&self, number: BlockNumber) -> Option<Hash>;

    /// Header by hash (canonical or not).
    fn header_by_hash(&self, hash: &Hash) -> Option<BlockHeader>;

    /// Canonical header at `number`, or `None` past the chain head.
    fn header_by_number(&self, number: BlockNumber) -> Option<BlockHeader>;

    /// Receipts of the block with `hash`, in transaction order.
    fn receipts_by_hash(&self, hash: &Hash) -> Option<Vec<TransactionReceipt>>;

    /// Body of the block with `hash`.
    fn body_by_hash(&self, hash: &Hash) -> Option<BlockBody>;

    /// Whether the block with `hash` is on the canonical chain.
    fn is_canonical(&self, hash: &Hash) -> bool;
}

/// Segmented per-block digest storage (Driven Port)
///
/// Readers must observe either a complete digest or none at all, never a
/// partially written slot.
pub trait SegmentStore: Send + Sync {
    /// Addressing used by this store.
    fn layout(&self) -> SegmentLayout;

    /// Whether `segment` exists. Absence is a normal outcome.
    fn segment_exists(&self, segment: SegmentIndex) -> bool;

    /// Digest stored for `block`.
    ///
    /// Returns `Ok(None)` when the slot lies past the written tail of an
    /// existing segment. Calling this for an absent segment is a contract
    /// violation reported as `CacheError::SegmentMissing`.
    fn read_digest(&self, block: BlockNumber) -> Result<Option<BloomDigest>, CacheError>;

    /// Write `digest` into `block`'s slot, creating or extending the
    /// segment as needed. Idempotent.
    fn write_digest(&self, block: BlockNumber, digest: &BloomDigest) -> Result<(), CacheError>;

    /// Write a contiguous run of slots starting at the first slot of
    /// `segment`.
    fn write_segment(
        &self,
        segment: SegmentIndex,
        digests: &[BloomDigest],
    ) -> Result<(), CacheError> {
        let layout = self.layout();
        if digests.len() as u64 > layout.capacity() {
            return Err(CacheError::SegmentOverflow {
                segment,
                capacity: layout.capacity(),
                count: digests.len() as u64,
            });
        }
        let first = layout.first_block(segment);
        for (offset, digest) in digests.iter().enumerate() {
            self.write_digest(first + offset as u64, digest)?;
        }
        Ok(())
    }
}
