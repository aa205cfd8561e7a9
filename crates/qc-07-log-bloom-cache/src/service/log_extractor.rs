//! # Log Extractor
//!
//! Exact verification of one candidate: canonicality check, then receipts
//! and body, then every log tested against the query.
//!
//! Per candidate: `Pending -> CanonicalityChecked -> {Discarded | Extracted}`.

use tracing::{debug, warn};

use shared_types::{BlockBody, BlockHeader, Hash, TransactionReceipt};

use crate::domain::{Candidate, CandidateOutcome, LogQuery, MatchedLog};
use crate::error::{ChainError, QueryError};
use crate::ports::ChainReader;

/// Exact log matcher over one chain backend.
pub struct LogExtractor<'a, C: ChainReader> {
    chain: &'a C,
}

impl<'a, C: ChainReader> LogExtractor<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Verify `candidate` and collect its exactly matching logs.
    ///
    /// Issues at most one header fetch (none for header-path candidates).
    /// A non-canonical candidate is discarded without fetching receipts or
    /// body.
    pub fn extract(
        &self,
        candidate: Candidate,
        query: &LogQuery,
    ) -> Result<CandidateOutcome, QueryError> {
        let hash = candidate.hash;
        let header = match candidate.header {
            Some(header) => header,
            None => self
                .chain
                .header_by_hash(&hash)
                .ok_or_else(|| fault(ChainError::MissingHeader { hash }))?,
        };
        if header.number != candidate.block_number {
            return Err(fault(ChainError::HeaderNumberMismatch {
                expected: candidate.block_number,
                actual: header.number,
            }));
        }

        if !self.chain.is_canonical(&hash) {
            debug!(
                block = candidate.block_number,
                hash = %hex::encode(hash),
                "Discarding non-canonical candidate"
            );
            return Ok(CandidateOutcome::Discarded);
        }

        self.extract_canonical(&header, &hash, query)
            .map(CandidateOutcome::Extracted)
    }

    /// Exact matches in the block `hash`, skipping the bloom pre-filter.
    ///
    /// Unknown and non-canonical blocks yield no logs.
    pub fn extract_block(
        &self,
        hash: &Hash,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError> {
        let Some(header) = self.chain.header_by_hash(hash) else {
            debug!(hash = %hex::encode(hash), "Unknown block");
            return Ok(Vec::new());
        };
        if !self.chain.is_canonical(hash) {
            debug!(hash = %hex::encode(hash), "Block is not canonical");
            return Ok(Vec::new());
        }
        self.extract_canonical(&header, hash, query)
    }

    fn extract_canonical(
        &self,
        header: &BlockHeader,
        hash: &Hash,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError> {
        let (receipts, body) = self.fetch_block_data(header, hash)?;

        let mut matched = Vec::new();
        let mut log_index = 0u64;
        for (tx_index, (receipt, transaction)) in
            receipts.iter().zip(&body.transactions).enumerate()
        {
            let mut tx_hash = None;
            for log in &receipt.logs {
                if query.matches_exact(log) {
                    let tx_hash = *tx_hash.get_or_insert_with(|| transaction.hash());
                    matched.push(MatchedLog::new(
                        log,
                        *hash,
                        header.number,
                        tx_hash,
                        tx_index as u64,
                        log_index,
                    ));
                }
                log_index += 1;
            }
        }
        Ok(matched)
    }

    fn fetch_block_data(
        &self,
        header: &BlockHeader,
        hash: &Hash,
    ) -> Result<(Vec<TransactionReceipt>, BlockBody), QueryError> {
        let receipts = self
            .chain
            .receipts_by_hash(hash)
            .ok_or_else(|| fault(ChainError::MissingReceipts { hash: *hash }))?;
        let body = self
            .chain
            .body_by_hash(hash)
            .ok_or_else(|| fault(ChainError::MissingBody { hash: *hash }))?;

        if receipts.len() != body.transactions.len() {
            return Err(fault(ChainError::ReceiptCountMismatch {
                block: header.number,
                receipts: receipts.len(),
                transactions: body.transactions.len(),
            }));
        }
        Ok((receipts, body))
    }
}

fn fault(error: ChainError) -> QueryError {
    warn!(error = %error, "Chain backend integrity fault");
    QueryError::Chain(error)
}
