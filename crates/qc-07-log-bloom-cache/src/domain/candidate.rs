//! Candidate blocks produced by the range scan

use shared_types::{BlockHeader, BlockNumber, Hash};

use super::bloom_digest::BloomDigest;
use super::matched_log::MatchedLog;

/// A block whose digest possibly matches a query, pending exact verification.
///
/// Consumed exactly once by the log extractor.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// Height of the block.
    pub block_number: BlockNumber,
    /// Canonical hash resolved by the scan.
    pub hash: Hash,
    /// Digest that passed the query's bloom test.
    pub digest: BloomDigest,
    /// Header already fetched on the uncached path, if any.
    pub header: Option<BlockHeader>,
    /// Which path produced this candidate.
    pub source: CandidateSource,
}

impl Candidate {
    /// Candidate from a cached slot; the header is fetched during extraction.
    pub fn from_cache(block_number: BlockNumber, hash: Hash, digest: BloomDigest) -> Self {
        Self {
            block_number,
            hash,
            digest,
            header: None,
            source: CandidateSource::Cache,
        }
    }

    /// Candidate from a header fetched by number.
    pub fn from_header(header: BlockHeader) -> Self {
        Self {
            block_number: header.number,
            hash: header.hash(),
            digest: BloomDigest::from_bytes(header.logs_bloom),
            header: Some(header),
            source: CandidateSource::Header,
        }
    }
}

/// Resolution path that produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateSource {
    /// Digest read from a segment slot, hash resolved by number.
    Cache,
    /// Header fetched by number, digest and hash taken from it.
    Header,
}

/// Terminal state of one candidate's verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Block is not on the canonical chain; contributes nothing.
    Discarded,
    /// Canonical block; every exactly-matching log, in block order.
    Extracted(Vec<MatchedLog>),
}

impl CandidateOutcome {
    /// Matched logs, empty for a discarded candidate.
    pub fn into_logs(self) -> Vec<MatchedLog> {
        match self {
            CandidateOutcome::Discarded => Vec::new(),
            CandidateOutcome::Extracted(logs) => logs,
        }
    }
}
