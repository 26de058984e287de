//! Rule-driven trading strategies

pub mod advisor;
pub mod rules;
pub mod engine;

pub use advisor::*;
pub use rules::*;
pub use engine::*;
