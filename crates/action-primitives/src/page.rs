//! Capability boundary consumed by the interaction driver

use action_locator::ResolvedSelector;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Classification of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationErrorKind {
    /// No element matched the selector
    NotFound,
    /// Element exists but cannot receive the interaction
    NotInteractable,
    /// Another element would receive the click
    Obstructed,
    /// Element handle no longer attached to the document
    Stale,
    /// Script evaluation failed
    Script,
    /// Navigation failed
    Navigation,
    /// Protocol or connection failure
    Transport,
    /// Browser could not be started
    Launch,
}

impl AutomationErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            AutomationErrorKind::NotFound => "not-found",
            AutomationErrorKind::NotInteractable => "not-interactable",
            AutomationErrorKind::Obstructed => "obstructed",
            AutomationErrorKind::Stale => "stale",
            AutomationErrorKind::Script => "script",
            AutomationErrorKind::Navigation => "navigation",
            AutomationErrorKind::Transport => "transport",
            AutomationErrorKind::Launch => "launch",
        }
    }
}

impl fmt::Display for AutomationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error reported by an [`AutomationPage`] implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct AutomationError {
    pub kind: AutomationErrorKind,
    pub message: String,
}

impl AutomationError {
    pub fn new(kind: AutomationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AutomationErrorKind::NotFound, message)
    }

    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::new(AutomationErrorKind::NotInteractable, message)
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(AutomationErrorKind::Stale, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AutomationErrorKind::Transport, message)
    }

    /// Obstructed, not-interactable and stale failures get one fallback attempt
    pub fn is_interaction(&self) -> bool {
        matches!(
            self.kind,
            AutomationErrorKind::NotInteractable
                | AutomationErrorKind::Obstructed
                | AutomationErrorKind::Stale
        )
    }

    /// Failures a wait loop keeps polling through
    pub fn is_transient_while_waiting(&self) -> bool {
        matches!(
            self.kind,
            AutomationErrorKind::NotFound | AutomationErrorKind::Stale
        )
    }
}

/// A page a browser-automation backend can drive.
///
/// Scripts passed to [`run_script`](AutomationPage::run_script) are JavaScript
/// function declarations invoked with `this` bound to the element.
#[async_trait]
pub trait AutomationPage: Send + Sync {
    /// Backend element handle
    type Element: Clone + Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), AutomationError>;

    /// First element matching the selector, `None` when nothing matches
    async fn find_element(
        &self,
        selector: &ResolvedSelector,
    ) -> Result<Option<Self::Element>, AutomationError>;

    async fn find_all_elements(
        &self,
        selector: &ResolvedSelector,
    ) -> Result<Vec<Self::Element>, AutomationError>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, AutomationError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, AutomationError>;

    /// Native (input-event) click
    async fn click(&self, element: &Self::Element) -> Result<(), AutomationError>;

    async fn run_script(
        &self,
        element: &Self::Element,
        function: &str,
    ) -> Result<Value, AutomationError>;

    async fn text(&self, element: &Self::Element) -> Result<String, AutomationError>;

    /// Type into the element, pressing Enter afterwards when `submit` is set
    async fn send_keys(
        &self,
        element: &Self::Element,
        text: &str,
        submit: bool,
    ) -> Result<(), AutomationError>;

    async fn current_url(&self) -> Result<String, AutomationError>;

    /// Release the browser session
    async fn quit(&self) -> Result<(), AutomationError>;
}

/// Starts browser sessions
#[async_trait]
pub trait PageLauncher: Send + Sync {
    type Page: AutomationPage;

    async fn launch(&self) -> Result<Self::Page, AutomationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_kinds() {
        assert!(AutomationError::not_interactable("covered").is_interaction());
        assert!(AutomationError::stale("detached").is_interaction());
        assert!(AutomationError::new(AutomationErrorKind::Obstructed, "overlay").is_interaction());
        assert!(!AutomationError::transport("closed").is_interaction());
        assert!(!AutomationError::not_found("#q").is_interaction());
    }

    #[test]
    fn test_transient_kinds() {
        assert!(AutomationError::not_found("#q").is_transient_while_waiting());
        assert!(AutomationError::stale("detached").is_transient_while_waiting());
        assert!(!AutomationError::transport("closed").is_transient_while_waiting());
    }

    #[test]
    fn test_display() {
        let err = AutomationError::not_interactable("element is covered");
        assert_eq!(err.to_string(), "not-interactable: element is covered");
    }
}
