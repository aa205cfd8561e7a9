//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Logs bloom digest and its hash projection
//! - Log query (bloom pre-filter and exact match)
//! - Segment addressing and seam splitting
//! - Candidates and matched logs
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod bloom_digest;
pub mod cancellation;
pub mod candidate;
pub mod config;
pub mod hash_functions;
pub mod log_query;
pub mod matched_log;
pub mod segment;

pub use bloom_digest::{BloomDigest, DIGEST_BITS, DIGEST_BYTES};
pub use cancellation::CancellationFlag;
pub use candidate::{Candidate, CandidateOutcome, CandidateSource};
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_BLOCKS_PER_SEGMENT};
pub use log_query::LogQuery;
pub use matched_log::MatchedLog;
pub use segment::{
    parse_segment_file_name, segment_file_name, SeamSplit, SegmentIndex, SegmentLayout,
    SegmentRange, SlotState,
};
