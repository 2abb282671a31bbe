//! Error handling
//!
//! Defines error types and handling for the bridge.

pub mod handlers;
pub mod types;

pub use types::*;
