//! Transfer registry
//!
//! Maps each canonical source directory to the rule that handles it. Built
//! once at startup and read-only afterwards, so it is shared through `Arc`
//! without locking.

use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{DuplicatePolicy, TransferConfig};
use crate::error::RegistryError;
use crate::paths::{CanonicalPath, resolve};
use crate::registry::TransferRule;

#[derive(Debug, Default)]
pub struct TransferRegistry {
    rules: HashMap<CanonicalPath, TransferRule>,
    sources: Vec<PathBuf>,
}

impl TransferRegistry {
    /// Builds the registry from the configured rules, in order.
    ///
    /// Any unresolvable source directory or invalid pattern aborts the build.
    pub fn build(
        configs: &[TransferConfig],
        policy: DuplicatePolicy,
    ) -> Result<Self, RegistryError> {
        let mut rules = HashMap::with_capacity(configs.len());
        let mut owners: HashMap<CanonicalPath, usize> = HashMap::with_capacity(configs.len());
        let mut sources = Vec::with_capacity(configs.len());

        for (index, config) in configs.iter().enumerate() {
            let key = resolve(&config.src)?;
            let rule = TransferRule::new(config.clone())?;

            if let Some(first) = owners.insert(key.clone(), index) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(RegistryError::DuplicateSource {
                            path: key.into_path_buf(),
                            first,
                            second: index,
                        });
                    }
                    DuplicatePolicy::Overwrite => {
                        warn!(
                            "Rule {} for {} replaces rule {} for the same directory",
                            index, key, first
                        );
                    }
                }
            } else {
                sources.push(config.src.clone());
            }

            info!("Registered {} -> {}:{}", key, config.host, config.dst);
            rules.insert(key, rule);
        }

        Ok(Self { rules, sources })
    }

    pub fn lookup(&self, key: &CanonicalPath) -> Option<&TransferRule> {
        self.rules.get(key)
    }

    /// Source directories to subscribe, as configured, one per registered key
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
