//! Service lifecycle
//!
//! Startup wiring and the main run loop.

pub mod bridge;

pub use bridge::Service;
