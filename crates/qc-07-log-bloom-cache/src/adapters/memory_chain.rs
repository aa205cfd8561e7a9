//! # In-Memory Chain
//!
//! A `ChainReader` over blocks held in memory, counting every backend call.
//! Tests use the counters to check which resolution path a scan took.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use shared_types::{
    BlockBody, BlockHeader, BlockNumber, Hash, Log, Transaction, TransactionReceipt,
};

use crate::domain::BloomDigest;
use crate::ports::ChainReader;

/// Number of calls per `ChainReader` method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub resolve_hash_by_number: u64,
    pub header_by_hash: u64,
    pub header_by_number: u64,
    pub receipts_by_hash: u64,
    pub body_by_hash: u64,
    pub is_canonical: u64,
}

impl CallCounts {
    /// Calls across all methods.
    pub fn total(&self) -> u64 {
        self.resolve_hash_by_number
            + self.header_by_hash
            + self.header_by_number
            + self.receipts_by_hash
            + self.body_by_hash
            + self.is_canonical
    }
}

#[derive(Default)]
struct CallCounters {
    resolve_hash_by_number: AtomicU64,
    header_by_hash: AtomicU64,
    header_by_number: AtomicU64,
    receipts_by_hash: AtomicU64,
    body_by_hash: AtomicU64,
    is_canonical: AtomicU64,
}

impl CallCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CallCounts {
        CallCounts {
            resolve_hash_by_number: self.resolve_hash_by_number.load(Ordering::Relaxed),
            header_by_hash: self.header_by_hash.load(Ordering::Relaxed),
            header_by_number: self.header_by_number.load(Ordering::Relaxed),
            receipts_by_hash: self.receipts_by_hash.load(Ordering::Relaxed),
            body_by_hash: self.body_by_hash.load(Ordering::Relaxed),
            is_canonical: self.is_canonical.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.resolve_hash_by_number.store(0, Ordering::Relaxed);
        self.header_by_hash.store(0, Ordering::Relaxed);
        self.header_by_number.store(0, Ordering::Relaxed);
        self.receipts_by_hash.store(0, Ordering::Relaxed);
        self.body_by_hash.store(0, Ordering::Relaxed);
        self.is_canonical.store(0, Ordering::Relaxed);
    }
}

#[derive(Default)]
struct ChainState {
    canonical: Vec<Hash>,
    headers: HashMap<Hash, BlockHeader>,
    bodies: HashMap<Hash, BlockBody>,
    receipts: HashMap<Hash, Vec<TransactionReceipt>>,
    orphaned: HashSet<Hash>,
}

/// Chain backend held in memory.
#[derive(Default)]
pub struct InMemoryChain {
    state: RwLock<ChainState>,
    calls: CallCounters,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a canonical block and return its header.
    ///
    /// The header's logs bloom is computed from `receipts`.
    pub fn append_block(
        &self,
        transactions: Vec<Transaction>,
        receipts: Vec<TransactionReceipt>,
    ) -> BlockHeader {
        let mut state = self.state.write();
        let number = state.canonical.len() as BlockNumber;
        let parent_hash = state.canonical.last().copied().unwrap_or([0u8; 32]);
        let header = BlockHeader {
            parent_hash,
            number,
            logs_bloom: BloomDigest::from_receipts(&receipts).to_bytes(),
            gas_used: receipts.last().map(|r| r.cumulative_gas_used).unwrap_or(0),
            timestamp: 1_000 + number,
            ..Default::default()
        };
        let hash = header.hash();

        state.canonical.push(hash);
        state.headers.insert(hash, header.clone());
        state.bodies.insert(
            hash,
            BlockBody {
                transactions,
                ommers: Vec::new(),
            },
        );
        state.receipts.insert(hash, receipts);
        header
    }

    /// Append a block with one transaction per entry of `logs_per_tx`,
    /// each emitting the given logs.
    pub fn append_block_with_logs(&self, logs_per_tx: Vec<Vec<Log>>) -> BlockHeader {
        let number = self.state.read().canonical.len() as u64;
        let mut transactions = Vec::with_capacity(logs_per_tx.len());
        let mut receipts = Vec::with_capacity(logs_per_tx.len());
        for (i, logs) in logs_per_tx.into_iter().enumerate() {
            transactions.push(Transaction {
                from: [0x11; 20],
                to: Some([0x22; 20]),
                nonce: number * 1_000 + i as u64,
                gas_limit: 21_000,
                ..Default::default()
            });
            receipts.push(TransactionReceipt {
                success: true,
                cumulative_gas_used: 21_000 * (i as u64 + 1),
                logs,
            });
        }
        self.append_block(transactions, receipts)
    }

    /// Append `count` blocks with no transactions.
    pub fn append_empty_blocks(&self, count: u64) {
        for _ in 0..count {
            self.append_block(Vec::new(), Vec::new());
        }
    }

    /// Mark a block as no longer canonical while leaving the number index
    /// pointing at it, as happens when a reorg lands mid-scan.
    pub fn orphan_block(&self, hash: &Hash) {
        self.state.write().orphaned.insert(*hash);
    }

    /// Drop a block's receipts (simulates an incomplete local chain).
    pub fn remove_receipts(&self, hash: &Hash) {
        self.state.write().receipts.remove(hash);
    }

    /// Drop a block's body.
    pub fn remove_body(&self, hash: &Hash) {
        self.state.write().bodies.remove(hash);
    }

    /// Canonical hash at `number`, without counting a call.
    pub fn hash_at(&self, number: BlockNumber) -> Option<Hash> {
        self.state.read().canonical.get(number as usize).copied()
    }

    /// Highest canonical block number.
    pub fn head_number(&self) -> Option<BlockNumber> {
        let len = self.state.read().canonical.len() as u64;
        len.checked_sub(1)
    }

    /// Calls made so far.
    pub fn calls(&self) -> CallCounts {
        self.calls.snapshot()
    }

    /// Zero every call counter.
    pub fn reset_calls(&self) {
        self.calls.reset();
    }
}

impl ChainReader for InMemoryChain {
    fn resolve_hash_by_number(&self, number: BlockNumber) -> Option<Hash> {
        CallCounters::bump(&self.calls.resolve_hash_by_number);
        self.hash_at(number)
    }

    fn header_by_hash(&self, hash: &Hash) -> Option<BlockHeader> {
        CallCounters::bump(&self.calls.header_by_hash);
        self.state.read().headers.get(hash).cloned()
    }

    fn header_by_number(&self, number: BlockNumber) -> Option<BlockHeader> {
        CallCounters::bump(&self.calls.header_by_number);
        let state = self.state.read();
        let hash = state.canonical.get(number as usize)?;
        state.headers.get(hash).cloned()
    }

    fn receipts_by_hash(&self, hash: &Hash) -> Option<Vec<TransactionReceipt>> {
        CallCounters::bump(&self.calls.receipts_by_hash);
        self.state.read().receipts.get(hash).cloned()
    }

    fn body_by_hash(&self, hash: &Hash) -> Option<BlockBody> {
        CallCounters::bump(&self.calls.body_by_hash);
        self.state.read().bodies.get(hash).cloned()
    }

    fn is_canonical(&self, hash: &Hash) -> bool {
        CallCounters::bump(&self.calls.is_canonical);
        let state = self.state.read();
        !state.orphaned.contains(hash) && state.canonical.contains(hash)
    }
}
