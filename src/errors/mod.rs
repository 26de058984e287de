//! Error taxonomy for trading and strategy management

pub mod trade_error;
pub mod submission;
pub mod strategy_error;

pub use trade_error::*;
pub use submission::*;
pub use strategy_error::*;
