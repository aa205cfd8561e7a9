//! Adapters Layer
//!
//! Implementations of the outbound ports:
//! - `FileSegmentStore`: segment files on disk
//! - `InMemorySegmentStore`: segments held in memory
//! - `InMemoryChain`: call-counting chain backend

pub mod memory_chain;
pub mod memory_segment;
pub mod segment_file;

pub use memory_chain::{CallCounts, InMemoryChain};
pub use memory_segment::InMemorySegmentStore;
pub use segment_file::FileSegmentStore;
