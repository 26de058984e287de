//! Meme Swap Agent - trading execution core for a meme-token community agent
//!
//! Discovers swap routes through a DEX aggregator, validates them against a
//! risk envelope, submits them through a pluggable signer, keeps a bounded
//! history of executions and drives it all from rule-based strategies.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod execution;
pub mod validation;
pub mod strategy;
pub mod storage;
pub mod events;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{TradeError, TradeErrorKind, RejectionReason};
pub use types::*;
