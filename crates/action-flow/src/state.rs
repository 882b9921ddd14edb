//! Scenario states
//!
//! [`ScenarioState`] is the runtime view used in reports and errors. The unit
//! structs are the compile-time markers carried by
//! [`ScenarioRun`](crate::ScenarioRun).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    NotStarted,
    BrowserReady,
    OnTargetPage,
    SearchSubmitted,
    ResultVerified,
    ItemInCart,
    CheckoutInitiated,
    AuthRedirectVerified,
    Closed,
}

impl ScenarioState {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioState::NotStarted => "not_started",
            ScenarioState::BrowserReady => "browser_ready",
            ScenarioState::OnTargetPage => "on_target_page",
            ScenarioState::SearchSubmitted => "search_submitted",
            ScenarioState::ResultVerified => "result_verified",
            ScenarioState::ItemInCart => "item_in_cart",
            ScenarioState::CheckoutInitiated => "checkout_initiated",
            ScenarioState::AuthRedirectVerified => "auth_redirect_verified",
            ScenarioState::Closed => "closed",
        }
    }

    /// True once the whole flow has been verified
    pub fn is_complete(&self) -> bool {
        *self == ScenarioState::AuthRedirectVerified
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compile-time state marker
pub trait StateMarker: Send + Sync + 'static {
    const STATE: ScenarioState;
}

macro_rules! state_markers {
    ($($marker:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $marker;

            impl StateMarker for $marker {
                const STATE: ScenarioState = ScenarioState::$marker;
            }
        )*
    };
}

state_markers!(
    BrowserReady,
    OnTargetPage,
    SearchSubmitted,
    ResultVerified,
    ItemInCart,
    CheckoutInitiated,
    AuthRedirectVerified,
);
