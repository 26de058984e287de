//! Publish/subscribe fan-out of trade outcomes

pub mod bus;

pub use bus::*;
