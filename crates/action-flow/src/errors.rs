//! Scenario error types

use crate::report::RunReport;
use crate::state::ScenarioState;
use action_primitives::{ActionError, AutomationError};
use thiserror::Error;

/// Step failures
#[derive(Debug, Error, Clone)]
pub enum FlowError {
    /// Interaction driver error
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Page content did not match expectations
    #[error("Assertion failed in {step}: expected {expected}, got '{actual}'")]
    AssertionFailed {
        step: String,
        expected: String,
        actual: String,
    },

    /// Browser session could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(#[source] AutomationError),
}

impl FlowError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, FlowError::AssertionFailed { .. })
    }

    /// Registry key involved, when known
    pub fn key(&self) -> Option<&str> {
        match self {
            FlowError::Action(err) => err.key(),
            _ => None,
        }
    }
}

/// A run that stopped before completing.
///
/// The page has already been released when this is returned.
#[derive(Debug, Error)]
#[error("Scenario aborted at {state} ({step}): {error}")]
pub struct ScenarioAborted {
    /// Last state reached before the failing step
    pub state: ScenarioState,

    /// Step that failed
    pub step: String,

    #[source]
    pub error: FlowError,

    /// Report up to the failure
    pub report: Box<RunReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::LocatorError;

    #[test]
    fn test_assertion_message() {
        let err = FlowError::AssertionFailed {
            step: "verify_results".to_string(),
            expected: "heading containing 'bilgisayar'".to_string(),
            actual: "Telefonlar".to_string(),
        };
        assert!(err.is_assertion());
        assert!(err.to_string().contains("Telefonlar"));
    }

    #[test]
    fn test_abort_message_names_state_and_key() {
        let err: FlowError = ActionError::from(LocatorError::UnknownKey {
            key: "btn_Card".to_string(),
        })
        .into();
        assert_eq!(err.key(), Some("btn_Card"));

        let aborted = ScenarioAborted {
            state: ScenarioState::ResultVerified,
            step: "add_first_item_to_cart".to_string(),
            error: err,
            report: Box::new(RunReport::new()),
        };
        let message = aborted.to_string();
        assert!(message.contains("result_verified"));
        assert!(message.contains("btn_Card"));
    }
}
