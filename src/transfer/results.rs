//! Transfer result types

/// Result of one successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub bytes: u64,
    pub remote_path: String,
    /// False when the local copy could not be deleted afterwards
    pub source_removed: bool,
}
