//! Per-block logs bloom digest
//!
//! INVARIANTS:
//! - No false negatives: after `insert(x)`, `contains_element(x)` is true.
//! - Bits are monotonic: no operation except construction clears a bit.
//! - The byte layout is the 256-byte Ethereum logs bloom and round-trips
//!   byte-for-byte through storage.

use std::fmt;

use bitvec::prelude::*;
use shared_types::{Log, TransactionReceipt, LOGS_BLOOM_BYTES};

use super::hash_functions::bloom_bit_indices;

/// Size of a digest in bytes.
pub const DIGEST_BYTES: usize = LOGS_BLOOM_BYTES;

/// Size of a digest in bits.
pub const DIGEST_BITS: usize = DIGEST_BYTES * 8;

/// Fixed-size 2048-bit bloom over the addresses and topics of a block's logs.
///
/// Bit `i` of the Ethereum bloom (counted from the least significant end of
/// the big-endian number) is stored at `Msb0` position `2047 - i` of the
/// byte array, which is byte `255 - i / 8`, bit `i % 8`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BloomDigest {
    bytes: [u8; DIGEST_BYTES],
}

impl Default for BloomDigest {
    fn default() -> Self {
        Self::empty()
    }
}

impl BloomDigest {
    /// Digest with no bits set.
    pub const fn empty() -> Self {
        Self {
            bytes: [0u8; DIGEST_BYTES],
        }
    }

    /// Wrap raw bloom bytes (as stored in a header or a segment slot).
    pub const fn from_bytes(bytes: [u8; DIGEST_BYTES]) -> Self {
        Self { bytes }
    }

    /// Wrap a slice, returning `None` unless it is exactly 256 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; DIGEST_BYTES] = slice.try_into().ok()?;
        Some(Self { bytes })
    }

    /// Digest of a single element.
    pub fn of(element: &[u8]) -> Self {
        let mut digest = Self::empty();
        digest.insert(element);
        digest
    }

    /// Digest covering one log's address and topics.
    pub fn from_log(log: &Log) -> Self {
        let mut digest = Self::empty();
        digest.accrue_log(log);
        digest
    }

    /// Digest covering every log of every receipt (a block's logs bloom).
    pub fn from_receipts(receipts: &[TransactionReceipt]) -> Self {
        let mut digest = Self::empty();
        for log in receipts.iter().flat_map(|receipt| receipt.logs.iter()) {
            digest.accrue_log(log);
        }
        digest
    }

    /// Set the three projected bits for `element`.
    pub fn insert(&mut self, element: &[u8]) {
        let bits = self.bytes.view_bits_mut::<Msb0>();
        for index in bloom_bit_indices(element) {
            bits.set(DIGEST_BITS - 1 - index, true);
        }
    }

    /// Insert a log's address and each of its topics.
    pub fn accrue_log(&mut self, log: &Log) {
        self.insert(&log.address);
        for topic in &log.topics {
            self.insert(topic);
        }
    }

    /// OR `other` into this digest.
    pub fn accrue(&mut self, other: &BloomDigest) {
        for (s, o) in self.bytes.iter_mut().zip(other.bytes.iter()) {
            *s |= *o;
        }
    }

    /// Bitwise OR of two digests.
    pub fn union(&self, other: &BloomDigest) -> BloomDigest {
        let mut merged = *self;
        merged.accrue(other);
        merged
    }

    /// Superset test: every bit set in `pattern` is also set here.
    ///
    /// Returns `false` only if nothing `pattern` was built from can be in
    /// the set; `true` may be a false positive.
    pub fn possibly_contains(&self, pattern: &BloomDigest) -> bool {
        self.bytes
            .iter()
            .zip(pattern.bytes.iter())
            .all(|(s, p)| s & p == *p)
    }

    /// Test a raw element without building a pattern digest.
    pub fn contains_element(&self, element: &[u8]) -> bool {
        let bits = self.bytes.view_bits::<Msb0>();
        bloom_bit_indices(element)
            .iter()
            .all(|&index| bits[DIGEST_BITS - 1 - index])
    }

    /// True if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Number of bits set.
    pub fn bits_set(&self) -> usize {
        self.bytes.view_bits::<Msb0>().count_ones()
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_BYTES] {
        &self.bytes
    }

    /// Copy out the raw bytes.
    pub fn to_bytes(&self) -> [u8; DIGEST_BYTES] {
        self.bytes
    }
}

impl From<[u8; DIGEST_BYTES]> for BloomDigest {
    fn from(bytes: [u8; DIGEST_BYTES]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for BloomDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.bytes))
    }
}

impl fmt::Debug for BloomDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomDigest")
            .field("bits_set", &self.bits_set())
            .finish()
    }
}
