//! Error handlers
//!
//! Logging and process exit codes for fatal errors.

use crate::error::types::{AppError, RegistryError};
use log::error;

/// Log a fatal startup error
pub fn handle_error(err: &AppError) {
    error!("fmufer error: {}", err);
}

/// Convert error to process exit code
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Config(_) => 2,
        AppError::Registry(RegistryError::Resolve(_)) => 3,
        AppError::Registry(_) => 4,
        AppError::Watch(_) => 5,
        AppError::Io(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::{ResolveError, WatchError};
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_are_distinct_per_failure() {
        let config = AppError::Config(config::ConfigError::Message("bad".into()));
        let resolve = AppError::Registry(RegistryError::Resolve(ResolveError::NoParent(
            PathBuf::from("/"),
        )));
        let duplicate = AppError::Registry(RegistryError::DuplicateSource {
            path: PathBuf::from("/tmp"),
            first: 0,
            second: 1,
        });
        let watch = AppError::Watch(WatchError::Init(notify::Error::generic("boom")));
        let io = AppError::Io(io::Error::other("disk"));

        assert_eq!(exit_code(&config), 2);
        assert_eq!(exit_code(&resolve), 3);
        assert_eq!(exit_code(&duplicate), 4);
        assert_eq!(exit_code(&watch), 5);
        assert_eq!(exit_code(&io), 1);
    }
}
