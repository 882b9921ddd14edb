//! Application configuration
//!
//! Loaded from YAML by the CLI runtime, then adjusted by `STORECHECK_*`
//! environment variables and finally by command-line flags.

use action_flow::ScenarioConfig;
use action_locator::SourceCandidates;
use action_primitives::WaitConfig;
use cdp_adapter::{BrowserSettings, CHROME_PATH_ENV};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

pub const HEADLESS_ENV: &str = "STORECHECK_HEADLESS";
pub const BASE_URL_ENV: &str = "STORECHECK_BASE_URL";
pub const LOCATORS_ENV: &str = "STORECHECK_LOCATORS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storefront and scenario parameters
    pub scenario: ScenarioConfig,

    /// Chromium launch settings
    pub browser: BrowserSettings,

    /// Default element wait
    pub wait: WaitConfig,

    /// Locator source tried before the bundled defaults
    pub locators: Option<PathBuf>,
}

impl Config {
    /// Apply `STORECHECK_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| env::var(name).ok());
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value_of = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(raw) = value_of(HEADLESS_ENV) {
            self.browser.headless = matches!(
                raw.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
            info!(headless = self.browser.headless, "Headless mode from {}", HEADLESS_ENV);
        }
        if let Some(url) = value_of(BASE_URL_ENV) {
            info!(url = %url, "Base URL from {}", BASE_URL_ENV);
            self.scenario.base_url = url;
        }
        if let Some(path) = value_of(LOCATORS_ENV) {
            self.locators = Some(PathBuf::from(path));
        }
        if let Some(path) = value_of(CHROME_PATH_ENV) {
            self.browser.chrome_path = Some(PathBuf::from(path));
        }
    }

    /// Discovery order for the locator source; `explicit` wins over config
    pub fn locator_candidates(&self, explicit: Option<PathBuf>) -> SourceCandidates {
        SourceCandidates::discover(explicit.or_else(|| self.locators.clone()))
    }
}
