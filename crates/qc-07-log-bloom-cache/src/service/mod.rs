//! Service Layer
//!
//! Application services that orchestrate domain logic and reach the chain
//! and segment storage through ports.

pub mod bloom_cacher;
pub mod log_extractor;
pub mod log_query_service;
pub mod range_scanner;

pub use bloom_cacher::{BloomCacher, CacheReport};
pub use log_extractor::LogExtractor;
pub use log_query_service::LogQueryService;
pub use range_scanner::RangeScanner;
