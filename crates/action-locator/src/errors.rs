//! Error types for the locator registry

use std::path::PathBuf;
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Source could be read but not decoded into locator records
    #[error("Failed to load locator source {origin}: {reason}")]
    ConfigLoad { origin: String, reason: String },

    /// None of the candidate source locations yielded a readable stream
    #[error("No locator source found (tried: {})", display_paths(.tried))]
    SourceNotFound { tried: Vec<PathBuf> },

    /// Key is not present in the registry
    #[error("Unknown locator key: '{key}'")]
    UnknownKey { key: String },

    /// Stored strategy type is outside the supported set
    #[error("Unsupported locator type '{strategy_type}' (key: '{key}')")]
    UnsupportedStrategy { key: String, strategy_type: String },
}

impl LocatorError {
    /// Configuration failures abort a run before any step executes
    pub fn is_config_load(&self) -> bool {
        matches!(
            self,
            LocatorError::ConfigLoad { .. } | LocatorError::SourceNotFound { .. }
        )
    }

    /// Key that caused the failure, for lookup errors
    pub fn key(&self) -> Option<&str> {
        match self {
            LocatorError::UnknownKey { key } | LocatorError::UnsupportedStrategy { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
