//! Transfer rules
//!
//! A configured transfer plus its compiled file-name pattern.

use glob::Pattern;
use std::ffi::OsStr;

use crate::config::TransferConfig;
use crate::error::RegistryError;

#[derive(Debug, Clone)]
pub struct TransferRule {
    config: TransferConfig,
    pattern: Option<Pattern>,
}

impl TransferRule {
    pub fn new(config: TransferConfig) -> Result<Self, RegistryError> {
        let pattern = if config.pattern.is_empty() {
            None
        } else {
            let compiled =
                Pattern::new(&config.pattern).map_err(|source| RegistryError::InvalidPattern {
                    pattern: config.pattern.clone(),
                    source,
                })?;
            Some(compiled)
        };

        Ok(Self { config, pattern })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Returns true when `file_name` is selected by this rule's pattern.
    /// Rules without a pattern select every file.
    pub fn matches(&self, file_name: &OsStr) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => file_name.to_str().is_some_and(|name| pattern.matches(name)),
        }
    }
}
