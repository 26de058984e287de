//! Route providers and retry policy

pub mod provider;
pub mod jupiter;
pub mod retry;

pub use provider::*;
pub use jupiter::*;
pub use retry::*;
