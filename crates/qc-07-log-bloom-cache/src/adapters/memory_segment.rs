//! # In-Memory Segment Store
//!
//! Segments held as byte vectors behind a `parking_lot` lock, laid out
//! exactly like the on-disk files.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::BlockNumber;

use crate::domain::{BloomDigest, SegmentIndex, SegmentLayout, SlotState, DIGEST_BYTES};
use crate::error::CacheError;
use crate::ports::SegmentStore;

/// In-memory segment store for unit tests and embedders without a disk.
///
/// Holds each segment as the same flat byte array the file store writes,
/// so slot semantics (unwritten tail, torn tail) are identical.
#[derive(Debug)]
pub struct InMemorySegmentStore {
    layout: SegmentLayout,
    segments: RwLock<HashMap<SegmentIndex, Vec<u8>>>,
}

impl InMemorySegmentStore {
    pub fn new(layout: SegmentLayout) -> Self {
        Self {
            layout,
            segments: RwLock::new(HashMap::new()),
        }
    }

    /// Replace a segment's raw bytes (used to stage corrupt segments).
    pub fn put_raw_segment(&self, segment: SegmentIndex, bytes: Vec<u8>) {
        self.segments.write().insert(segment, bytes);
    }

    /// Drop a segment entirely.
    pub fn remove_segment(&self, segment: SegmentIndex) {
        self.segments.write().remove(&segment);
    }
}

impl SegmentStore for InMemorySegmentStore {
    fn layout(&self) -> SegmentLayout {
        self.layout
    }

    fn segment_exists(&self, segment: SegmentIndex) -> bool {
        self.segments.read().contains_key(&segment)
    }

    fn read_digest(&self, block: BlockNumber) -> Result<Option<BloomDigest>, CacheError> {
        let segment = self.layout.segment_index(block);
        let segments = self.segments.read();
        let bytes = segments
            .get(&segment)
            .ok_or(CacheError::SegmentMissing { segment })?;

        match self.layout.slot_state(block, bytes.len() as u64) {
            SlotState::Unwritten => Ok(None),
            SlotState::Torn => Err(CacheError::Truncated {
                segment,
                slot: self.layout.slot(block),
                file_len: bytes.len() as u64,
            }),
            SlotState::Present => {
                let start = self.layout.slot_offset(block) as usize;
                Ok(BloomDigest::from_slice(&bytes[start..start + DIGEST_BYTES]))
            }
        }
    }

    fn write_digest(&self, block: BlockNumber, digest: &BloomDigest) -> Result<(), CacheError> {
        let segment = self.layout.segment_index(block);
        let start = self.layout.slot_offset(block) as usize;
        let mut segments = self.segments.write();
        let bytes = segments.entry(segment).or_default();
        if let Some(torn) = self.layout.torn_tail_overrun(block, bytes.len() as u64) {
            return Err(CacheError::Truncated {
                segment,
                slot: torn,
                file_len: bytes.len() as u64,
            });
        }
        if bytes.len() < start + DIGEST_BYTES {
            bytes.resize(start + DIGEST_BYTES, 0);
        }
        bytes[start..start + DIGEST_BYTES].copy_from_slice(digest.as_bytes());
        Ok(())
    }
}
