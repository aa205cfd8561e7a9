//! Hash projection for the logs bloom
//!
//! Every element (address or topic) sets exactly three bits of the
//! 2048-bit digest. Each bit index is taken from a pair of bytes of the
//! element's keccak-256 hash, masked to 11 bits.

use sha3::{Digest, Keccak256};

/// Number of bits set per inserted element.
pub const BITS_PER_ELEMENT: usize = 3;

/// Mask that folds a 16-bit value into the 2048-bit index space.
const BIT_INDEX_MASK: u16 = 0x07FF;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the three bloom bit indices for an element.
///
/// Indices count from the least significant bit of the digest read as a
/// big-endian 2048-bit number.
pub fn bloom_bit_indices(element: &[u8]) -> [usize; BITS_PER_ELEMENT] {
    let hash = keccak256(element);
    let mut indices = [0usize; BITS_PER_ELEMENT];
    for (i, index) in indices.iter_mut().enumerate() {
        let pair = u16::from_be_bytes([hash[2 * i], hash[2 * i + 1]]);
        *index = (pair & BIT_INDEX_MASK) as usize;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_input() {
        // Well-known keccak-256 of the empty string
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_bit_indices_deterministic() {
        let element = [0x12u8; 20];

        assert_eq!(
            bloom_bit_indices(&element),
            bloom_bit_indices(&element),
            "Same input must produce same bit indices"
        );
    }

    #[test]
    fn test_bit_indices_in_range() {
        for i in 0u32..500 {
            for index in bloom_bit_indices(&i.to_be_bytes()) {
                assert!(index < 2048, "Bit index {} out of range", index);
            }
        }
    }

    #[test]
    fn test_bit_indices_spread_across_digest() {
        // 1000 elements * 3 bits over 8 buckets of 256 bits each
        let mut counts = [0usize; 8];
        for i in 0u32..1000 {
            for index in bloom_bit_indices(&i.to_le_bytes()) {
                counts[index / 256] += 1;
            }
        }

        for (bucket, count) in counts.iter().enumerate() {
            assert!(
                (187..=563).contains(count),
                "Bucket {} has {} entries, expected ~375",
                bucket,
                count
            );
        }
    }
}
