//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for external callers
//! - Driven Ports (outbound) - Chain backend and segment storage

pub mod inbound;
pub mod outbound;

pub use inbound::LogQueryApi;
pub use outbound::{ChainReader, SegmentStore};
