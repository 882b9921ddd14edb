//! Browser launch settings

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use which::which;

/// Environment variable naming an explicit Chrome/Chromium binary
pub const CHROME_PATH_ENV: &str = "STORECHECK_CHROME_PATH";

/// Set to `true` to launch Chrome with `--no-sandbox` (containers)
pub const DISABLE_SANDBOX_ENV: &str = "STORECHECK_DISABLE_SANDBOX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,

    /// Window size as (width, height)
    pub window_size: (u32, u32),

    /// Chrome executable; auto-detected when unset
    pub chrome_path: Option<PathBuf>,

    /// Extra command-line switches
    pub args: Vec<String>,

    /// Per-command CDP request timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// Time allowed for Chrome to expose its DevTools endpoint (milliseconds)
    pub launch_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: (1920, 1080),
            chrome_path: None,
            args: vec![
                "--disable-notifications".to_string(),
                "--disable-infobars".to_string(),
                "--start-maximized".to_string(),
            ],
            request_timeout_ms: 30_000,
            launch_timeout_ms: 20_000,
        }
    }
}

impl BrowserSettings {
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    /// Executable to launch: the configured path, then the environment, then
    /// well-known binary names on `PATH`. `None` lets chromiumoxide search.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        self.chrome_path.clone().or_else(detect_chrome_executable)
    }
}

fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var(CHROME_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    chrome_executable_names()
        .iter()
        .find_map(|name| which(name).ok())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

pub(crate) fn sandbox_disabled() -> bool {
    env::var(DISABLE_SANDBOX_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
        .unwrap_or(false)
}
