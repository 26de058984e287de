//! Core data types and structures

pub mod execution;
pub mod route;
pub mod risk;
pub mod strategy;
pub mod signals;
pub mod events;

pub use execution::*;
pub use route::*;
pub use risk::*;
pub use strategy::*;
pub use signals::*;
pub use events::*;
