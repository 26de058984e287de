//! Trade execution engine and submission collaborators

pub mod engine;
pub mod submitter;
pub mod simulation;

pub use engine::*;
pub use submitter::*;
pub use simulation::*;
