//! # Shared Types Crate
//!
//! Chain entities shared between the log bloom cache and the chain-storage
//! backends that feed it.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every header, body, receipt and log shape
//!   used across crates is defined here.
//! - **Byte-exact blooms**: `BlockHeader::logs_bloom` is the raw 256-byte
//!   Ethereum logs bloom, so cache producers can copy it verbatim.

pub mod entities;

pub use entities::*;
