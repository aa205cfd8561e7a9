//! Exact extraction result

use serde::Serialize;
use shared_types::{Address, BlockNumber, Hash, Log, Topic};

/// A log that satisfied a query exactly, with its block and transaction
/// position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedLog {
    /// Address of the emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Topic>,
    /// Unindexed payload.
    pub data: Vec<u8>,
    /// Hash of the containing block.
    pub block_hash: Hash,
    /// Height of the containing block.
    pub block_number: BlockNumber,
    /// Hash of the emitting transaction.
    pub transaction_hash: Hash,
    /// Position of the emitting transaction in the block.
    pub transaction_index: u64,
    /// Position of the log among all logs of the block.
    pub log_index: u64,
    /// Always false: only canonical blocks produce matches.
    pub removed: bool,
}

impl MatchedLog {
    /// Attach block and transaction position to a log.
    pub fn new(
        log: &Log,
        block_hash: Hash,
        block_number: BlockNumber,
        transaction_hash: Hash,
        transaction_index: u64,
        log_index: u64,
    ) -> Self {
        Self {
            address: log.address,
            topics: log.topics.clone(),
            data: log.data.clone(),
            block_hash,
            block_number,
            transaction_hash,
            transaction_index,
            log_index,
            removed: false,
        }
    }

    /// The bare log.
    pub fn to_log(&self) -> Log {
        Log::new(self.address, self.topics.clone(), self.data.clone())
    }
}
