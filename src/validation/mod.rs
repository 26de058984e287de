//! Validation of trade parameters and candidate routes

pub mod params;
pub mod route;

pub use params::*;
pub use route::*;
