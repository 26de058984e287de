//! Trade history and file persistence

pub mod history;
pub mod executions;

pub use history::*;
pub use executions::*;
