//! Transfer rule registry
//!
//! Canonical source directory to transfer rule mapping.

pub mod rule;
pub mod transfer_registry;

pub use rule::TransferRule;
pub use transfer_registry::TransferRegistry;
