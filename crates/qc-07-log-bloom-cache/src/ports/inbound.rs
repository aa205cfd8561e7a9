//! Inbound Ports (Driving Ports)
//!
//! The API external callers (RPC handlers, filter managers) use to run log
//! queries.

use shared_types::{BlockNumber, Hash};

use crate::domain::{CancellationFlag, LogQuery, MatchedLog};
use crate::error::QueryError;

/// Primary log query API (Driving Port)
pub trait LogQueryApi: Send + Sync {
    /// All logs matching `query` in blocks `[from, to]`.
    ///
    /// Logs are ordered by block number, then by log index. `to < from`
    /// yields an empty result; a range past the chain head is truncated at
    /// the head.
    fn matching_logs(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError>;

    /// Same as `matching_logs`, checking `cancel` before each block.
    ///
    /// A cancelled scan returns `QueryError::Cancelled`.
    fn matching_logs_cancellable(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        query: &LogQuery,
        cancel: &CancellationFlag,
    ) -> Result<Vec<MatchedLog>, QueryError>;

    /// Exact matches in the single canonical block `hash`, without the
    /// bloom pre-filter. Unknown or non-canonical blocks yield nothing.
    fn matching_logs_for_block(
        &self,
        hash: &Hash,
        query: &LogQuery,
    ) -> Result<Vec<MatchedLog>, QueryError>;
}
