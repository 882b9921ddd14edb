//! Scenario configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Storefront home page
    pub base_url: String,

    /// Term typed into the search box
    pub search_term: String,

    /// Text the results heading must contain (case-insensitive)
    pub expected_heading: String,

    /// URL fragment that proves the checkout redirected to login
    pub login_url_fragment: String,

    /// Pause after each page-changing step (milliseconds)
    pub settle_ms: u64,

    /// How long to look for the cookie banner (milliseconds)
    pub cookie_timeout_ms: u64,

    /// How long to wait for the login redirect (milliseconds)
    pub login_timeout_ms: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.hepsiburada.com".to_string(),
            search_term: "bilgisayar".to_string(),
            expected_heading: "bilgisayar".to_string(),
            login_url_fragment: "giris.hepsiburada.com".to_string(),
            settle_ms: 2_000,
            cookie_timeout_ms: 15_000,
            login_timeout_ms: 20_000,
        }
    }
}

impl ScenarioConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn cookie_timeout(&self) -> Duration {
        Duration::from_millis(self.cookie_timeout_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    /// Search for `term`, expecting it in the results heading
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.expected_heading = term.clone();
        self.search_term = term;
        self
    }
}
