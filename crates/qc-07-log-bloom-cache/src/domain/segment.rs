//! Segment addressing
//!
//! A segment holds `capacity` consecutive digest slots. Block `n` lives in
//! segment `n / capacity`, slot `n % capacity`, at byte offset
//! `slot * DIGEST_BYTES` of that segment's file. Addressing is a pure
//! function of the block number and the capacity, so no two blocks share
//! a slot.

use std::ops::RangeInclusive;

use shared_types::BlockNumber;

use super::bloom_digest::DIGEST_BYTES;
use crate::error::ConfigError;

/// Index of a segment file.
pub type SegmentIndex = u64;

/// Segment file name prefix.
pub const SEGMENT_FILE_PREFIX: &str = "logBloom-";

/// Segment file name suffix.
pub const SEGMENT_FILE_SUFFIX: &str = ".index";

/// File name for a segment: `logBloom-{index}.index`.
pub fn segment_file_name(segment: SegmentIndex) -> String {
    format!("{SEGMENT_FILE_PREFIX}{segment}{SEGMENT_FILE_SUFFIX}")
}

/// Parse a segment index back out of a file name.
pub fn parse_segment_file_name(name: &str) -> Option<SegmentIndex> {
    name.strip_prefix(SEGMENT_FILE_PREFIX)?
        .strip_suffix(SEGMENT_FILE_SUFFIX)?
        .parse()
        .ok()
}

/// Fixed segment capacity and the addressing derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentLayout {
    capacity: u64,
}

impl SegmentLayout {
    /// Create a layout of `capacity` blocks per segment.
    ///
    /// Fails for a zero capacity, or one whose segment size does not fit a
    /// u64 byte offset. Every slot offset and slot end of a valid layout
    /// fits in a u64.
    pub fn new(capacity: u64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity { capacity });
        }
        if capacity.checked_mul(DIGEST_BYTES as u64).is_none() {
            return Err(ConfigError::CapacityOverflow { capacity });
        }
        Ok(Self { capacity })
    }

    /// Blocks per segment.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Full size of a segment file in bytes.
    pub fn segment_bytes(&self) -> u64 {
        self.capacity * DIGEST_BYTES as u64
    }

    /// Segment holding `block`.
    pub fn segment_index(&self, block: BlockNumber) -> SegmentIndex {
        block / self.capacity
    }

    /// Slot of `block` within its segment.
    pub fn slot(&self, block: BlockNumber) -> u64 {
        block % self.capacity
    }

    /// Byte offset of `block`'s slot within its segment file.
    pub fn slot_offset(&self, block: BlockNumber) -> u64 {
        self.slot(block) * DIGEST_BYTES as u64
    }

    /// First block number stored in `segment`.
    pub fn first_block(&self, segment: SegmentIndex) -> BlockNumber {
        segment * self.capacity
    }

    /// Last block number stored in `segment` (clamped at `u64::MAX`).
    pub fn last_block(&self, segment: SegmentIndex) -> BlockNumber {
        self.first_block(segment).saturating_add(self.capacity - 1)
    }

    /// Block range covered by `segment`.
    pub fn segment_blocks(&self, segment: SegmentIndex) -> RangeInclusive<BlockNumber> {
        self.first_block(segment)..=self.last_block(segment)
    }

    /// Classify `block`'s slot against a segment of `segment_len` bytes.
    pub fn slot_state(&self, block: BlockNumber, segment_len: u64) -> SlotState {
        let start = self.slot_offset(block);
        if segment_len.saturating_sub(start) >= DIGEST_BYTES as u64 {
            SlotState::Present
        } else if start < segment_len {
            SlotState::Torn
        } else {
            SlotState::Unwritten
        }
    }

    /// Torn slot a write starting at `first_block` would leave buried
    /// inside a segment of `segment_len` bytes.
    ///
    /// A write that starts at or before the torn slot overwrites it and
    /// yields `None`.
    pub fn torn_tail_overrun(&self, first_block: BlockNumber, segment_len: u64) -> Option<u64> {
        let digest = DIGEST_BYTES as u64;
        if segment_len % digest == 0 {
            return None;
        }
        let torn = segment_len / digest;
        (self.slot(first_block) > torn).then_some(torn)
    }

    /// Split `[from, to]` at every segment boundary (seam).
    ///
    /// Yields nothing when `to < from`.
    pub fn split_range(&self, from: BlockNumber, to: BlockNumber) -> SeamSplit {
        SeamSplit {
            layout: *self,
            next: from,
            to,
            done: to < from,
        }
    }
}

/// Where a slot stands relative to the written length of its segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// All 256 bytes are on disk (an all-zero slot included).
    Present,
    /// The segment ends inside the slot: torn or corrupt tail.
    Torn,
    /// The segment ends at or before the slot start; not written yet.
    Unwritten,
}

/// A maximal piece of a query range lying inside one segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentRange {
    /// Segment holding every block of this piece.
    pub segment: SegmentIndex,
    /// First block (inclusive).
    pub from: BlockNumber,
    /// Last block (inclusive).
    pub to: BlockNumber,
}

impl SegmentRange {
    /// Number of blocks in this piece.
    pub fn len(&self) -> u64 {
        self.to - self.from + 1
    }

    /// Always false; a piece holds at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Block numbers in ascending order.
    pub fn blocks(&self) -> RangeInclusive<BlockNumber> {
        self.from..=self.to
    }
}

/// Iterator over the per-segment pieces of a range, in ascending order.
#[derive(Clone, Debug)]
pub struct SeamSplit {
    layout: SegmentLayout,
    next: BlockNumber,
    to: BlockNumber,
    done: bool,
}

impl Iterator for SeamSplit {
    type Item = SegmentRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let segment = self.layout.segment_index(self.next);
        let end = self.layout.last_block(segment).min(self.to);
        let piece = SegmentRange {
            segment,
            from: self.next,
            to: end,
        };
        if end == self.to {
            self.done = true;
        } else {
            self.next = end + 1;
        }
        Some(piece)
    }
}
