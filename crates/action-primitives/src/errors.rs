//! Error types for the interaction driver

use crate::{page::AutomationError, types::WaitCondition};
use action_locator::LocatorError;
use thiserror::Error;

/// Interaction driver errors
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Key could not be resolved; never retried
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Element did not reach the condition in time
    #[error("Timed out after {timeout_ms}ms waiting for '{key}' ({selector}) to be {condition}")]
    InteractionTimeout {
        key: String,
        condition: WaitCondition,
        selector: String,
        timeout_ms: u64,
    },

    /// Page-level wait (e.g. URL) did not complete in time
    #[error("Timed out after {timeout_ms}ms waiting for {description}")]
    WaitTimeout { description: String, timeout_ms: u64 },

    /// Action on a located element failed (after fallback, if any)
    #[error("Interaction with '{key}' failed: {error}")]
    Interaction {
        key: String,
        #[source]
        error: AutomationError,
    },

    /// Backend failure outside an element interaction
    #[error("Browser automation error: {0}")]
    Automation(#[from] AutomationError),
}

impl ActionError {
    /// Timeouts are environment issues; callers decide if they are fatal
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ActionError::InteractionTimeout { .. } | ActionError::WaitTimeout { .. }
        )
    }

    /// Lookup and configuration errors are programmer errors and never retried
    pub fn is_config(&self) -> bool {
        matches!(self, ActionError::Locator(_))
    }

    /// Registry key involved, when known
    pub fn key(&self) -> Option<&str> {
        match self {
            ActionError::Locator(err) => err.key(),
            ActionError::InteractionTimeout { key, .. } | ActionError::Interaction { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_key_and_selector() {
        let err = ActionError::InteractionTimeout {
            key: "btn_Card".to_string(),
            condition: WaitCondition::Clickable,
            selector: "css=#cart".to_string(),
            timeout_ms: 15000,
        };
        let message = err.to_string();
        assert!(message.contains("btn_Card"));
        assert!(message.contains("css=#cart"));
        assert!(message.contains("clickable"));
        assert!(err.is_timeout());
        assert_eq!(err.key(), Some("btn_Card"));
    }

    #[test]
    fn test_locator_errors_are_config() {
        let err: ActionError = LocatorError::UnknownKey {
            key: "nope".to_string(),
        }
        .into();
        assert!(err.is_config());
        assert!(!err.is_timeout());
        assert_eq!(err.key(), Some("nope"));
    }
}
