//! Path canonicalization
//!
//! Watch events and configured source directories are compared by the
//! canonical form of their paths, never by string equality.

pub mod resolver;

pub use resolver::{CanonicalPath, resolve, resolve_parent};
