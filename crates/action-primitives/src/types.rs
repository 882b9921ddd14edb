//! Core data types for the interaction driver

use action_locator::ResolvedSelector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Function declaration that clicks through the DOM instead of input events
pub const SCRIPT_CLICK: &str = "function() { this.click(); }";

/// Function declaration that centres the element in the viewport
pub const SCROLL_INTO_VIEW: &str = "function() { this.scrollIntoView({block: 'center'}); }";

/// Readiness condition for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitCondition {
    /// Attached to the DOM
    Present,

    /// Displayed and enabled
    Clickable,

    /// Displayed
    Visible,

    /// At least one match, and every match displayed
    AllVisible,
}

impl WaitCondition {
    pub fn name(&self) -> &'static str {
        match self {
            WaitCondition::Present => "present",
            WaitCondition::Clickable => "clickable",
            WaitCondition::Visible => "visible",
            WaitCondition::AllVisible => "all-visible",
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something the driver can do to a located element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementAction {
    /// Native click through the backend
    Click,

    /// DOM `click()` from script; reaches elements behind overlays
    ScriptClick,

    /// Scroll element to the viewport centre
    ScrollIntoView,

    /// Arbitrary function declaration with `this` bound to the element
    Script(String),
}

impl ElementAction {
    pub fn name(&self) -> &str {
        match self {
            ElementAction::Click => "click",
            ElementAction::ScriptClick => "script-click",
            ElementAction::ScrollIntoView => "scroll-into-view",
            ElementAction::Script(_) => "script",
        }
    }
}

impl fmt::Display for ElementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element handle paired with the key and selector that found it
#[derive(Debug, Clone)]
pub struct Located<E> {
    pub key: String,
    pub selector: ResolvedSelector,
    pub element: E,
}

/// Which path of [`act_with_fallback`](crate::InteractionDriver::act_with_fallback) succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "kebab-case")]
pub enum ActionOutcome {
    /// Primary action succeeded; fallback never ran
    Primary,

    /// Primary failed with an interaction error and the fallback succeeded
    Fallback {
        /// Error that triggered the fallback
        primary_error: String,
    },
}

impl ActionOutcome {
    pub fn used_fallback(&self) -> bool {
        matches!(self, ActionOutcome::Fallback { .. })
    }
}

/// Result of a tolerant interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Tolerated {
    /// Element appeared and the action ran
    Performed { action: String },

    /// Element did not become ready within the timeout
    Absent { timeout_ms: u64 },
}

impl Tolerated {
    pub fn is_absent(&self) -> bool {
        matches!(self, Tolerated::Absent { .. })
    }
}

/// Notable interaction event, kept for the run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Registry key of the element
    pub key: String,

    /// When the event happened
    pub at: DateTime<Utc>,

    /// What happened
    pub event: InteractionEvent,
}

/// Interaction event kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InteractionEvent {
    /// Fallback action was used after the primary failed
    FallbackUsed {
        primary: String,
        fallback: String,
        primary_error: String,
    },

    /// Optional element never became ready
    Absent { timeout_ms: u64 },

    /// Optional element appeared and was handled
    Handled { action: String },
}

impl InteractionRecord {
    pub fn new(key: impl Into<String>, event: InteractionEvent) -> Self {
        Self {
            key: key.into(),
            at: Utc::now(),
            event,
        }
    }
}
