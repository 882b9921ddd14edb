//! Mapping from CDP failures to automation error kinds

use action_primitives::{AutomationError, AutomationErrorKind};
use chromiumoxide::error::CdpError;

/// Classify a CDP failure by its message.
///
/// Chrome reports element problems as protocol error text, so the kind is
/// derived from well-known fragments of that text.
pub fn classify(message: &str) -> AutomationErrorKind {
    let lower = message.to_ascii_lowercase();

    if lower.contains("intercept") || lower.contains("obscured") || lower.contains("would receive the click") {
        AutomationErrorKind::Obstructed
    } else if lower.contains("detached")
        || lower.contains("no node with given id")
        || lower.contains("could not find node")
        || lower.contains("cannot find context")
        || lower.contains("stale")
    {
        AutomationErrorKind::Stale
    } else if lower.contains("not interactable")
        || lower.contains("not visible")
        || lower.contains("layout object")
        || lower.contains("zero size")
        || lower.contains("not clickable")
        || lower.contains("scroll")
    {
        AutomationErrorKind::NotInteractable
    } else if lower.contains("not found")
        || lower.contains("no element")
        || lower.contains("search result")
    {
        AutomationErrorKind::NotFound
    } else if lower.contains("navigat") || lower.contains("net::err") {
        AutomationErrorKind::Navigation
    } else if lower.contains("evaluat") || lower.contains("javascript") || lower.contains("exception") {
        AutomationErrorKind::Script
    } else {
        AutomationErrorKind::Transport
    }
}

/// Convert a chromiumoxide error, naming the operation that failed
pub fn from_cdp(operation: &str, err: CdpError) -> AutomationError {
    let message = err.to_string();
    AutomationError::new(classify(&message), format!("{operation}: {message}"))
}

/// Same as [`from_cdp`] but with a fixed kind
pub fn with_kind(kind: AutomationErrorKind, operation: &str, err: CdpError) -> AutomationError {
    AutomationError::new(kind, format!("{operation}: {err}"))
}
