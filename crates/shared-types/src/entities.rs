//! # Core Chain Entities
//!
//! Defines the chain entities consumed by the log bloom cache and by any
//! backend that serves headers, bodies and receipts to it.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, `BlockBody`, `Transaction`
//! - **Execution output**: `TransactionReceipt`, `Log`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Keccak256};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// A log topic (32 bytes).
pub type Topic = Hash;

/// Height of a block in the chain.
pub type BlockNumber = u64;

/// Size of a header's logs bloom field in bytes (2048 bits).
pub const LOGS_BLOOM_BYTES: usize = 256;

/// The header of a block containing metadata and root hashes.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the parent block (creates the chain linkage).
    pub parent_hash: Hash,
    /// Block height in the chain.
    pub number: BlockNumber,
    /// Root hash of the state trie after applying this block.
    pub state_root: Hash,
    /// Root of the transactions in the block body.
    pub transactions_root: Hash,
    /// Root of the receipts produced by executing the block.
    pub receipts_root: Hash,
    /// Bloom of every log address and topic emitted in this block.
    #[serde_as(as = "Bytes")]
    pub logs_bloom: [u8; LOGS_BLOOM_BYTES],
    /// Gas used by all transactions in the block.
    pub gas_used: u64,
    /// Unix timestamp when the block was proposed.
    pub timestamp: u64,
    /// Arbitrary proposer data.
    pub extra_data: Vec<u8>,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: [0; 32],
            number: 0,
            state_root: [0; 32],
            transactions_root: [0; 32],
            receipts_root: [0; 32],
            logs_bloom: [0; LOGS_BLOOM_BYTES],
            gas_used: 0,
            timestamp: 0,
            extra_data: Vec::new(),
        }
    }
}

impl BlockHeader {
    /// Compute the block hash (keccak-256 over every header field).
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.parent_hash);
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.state_root);
        hasher.update(self.transactions_root);
        hasher.update(self.receipts_root);
        hasher.update(self.logs_bloom);
        hasher.update(self.gas_used.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(&self.extra_data);
        hasher.finalize().into()
    }
}

/// A transaction as included in a block body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address.
    pub from: Address,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Transaction value in base units.
    pub value: U256,
    /// Sender's nonce to prevent replay attacks.
    pub nonce: u64,
    /// Gas limit for this transaction.
    pub gas_limit: u64,
    /// Transaction payload (contract call data, etc.).
    pub data: Vec<u8>,
}

impl Transaction {
    /// Compute the transaction hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.from);
        if let Some(to) = &self.to {
            hasher.update(to);
        }
        let mut value_bytes = [0u8; 32];
        self.value.to_big_endian(&mut value_bytes);
        hasher.update(value_bytes);
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        hasher.update(&self.data);
        hasher.finalize().into()
    }
}

/// The body of a block: its transactions and ommer headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBody {
    /// Transactions in inclusion order.
    pub transactions: Vec<Transaction>,
    /// Uncle headers.
    pub ommers: Vec<BlockHeader>,
}

// =============================================================================
// CLUSTER B: EXECUTION OUTPUT
// =============================================================================

/// A log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Address of the contract that emitted the log.
    pub address: Address,
    /// Indexed topics (at most four on Ethereum).
    pub topics: Vec<Topic>,
    /// Unindexed payload.
    pub data: Vec<u8>,
}

impl Log {
    /// Create a new log entry.
    pub fn new(address: Address, topics: Vec<Topic>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }
}

/// The receipt of an executed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Whether execution succeeded.
    pub success: bool,
    /// Gas used in the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Logs emitted, in emission order.
    pub logs: Vec<Log>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_hash_depends_on_bloom() {
        let header = BlockHeader::default();
        let mut other = header.clone();
        other.logs_bloom[255] = 1;

        assert_ne!(
            header.hash(),
            other.hash(),
            "Logs bloom must be part of the header hash"
        );
    }

    #[test]
    fn test_header_serde_keeps_bloom() {
        let mut header = BlockHeader {
            number: 7,
            ..Default::default()
        };
        header.logs_bloom[3] = 0xAB;

        let json = serde_json::to_string(&header).expect("serialize");
        let restored: BlockHeader = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, header);
        assert_eq!(restored.hash(), header.hash());
    }

    #[test]
    fn test_transaction_hash_distinguishes_nonce() {
        let tx = Transaction {
            from: [1; 20],
            to: Some([2; 20]),
            value: U256::from(10),
            nonce: 0,
            gas_limit: 21_000,
            data: vec![],
        };
        let mut next = tx.clone();
        next.nonce = 1;

        assert_ne!(tx.hash(), next.hash());
    }
}
