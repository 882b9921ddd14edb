//! Chromium launcher

use crate::config::{sandbox_disabled, BrowserSettings};
use crate::errors::with_kind;
use crate::page::CdpPage;
use action_primitives::{AutomationError, AutomationErrorKind, PageLauncher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Launches a fresh Chromium process per session
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    settings: BrowserSettings,
}

impl ChromeLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    fn browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig, AutomationError> {
        let settings = &self.settings;
        let (width, height) = settings.window_size;

        let mut builder = BrowserConfig::builder()
            .request_timeout(settings.request_timeout())
            .launch_timeout(settings.launch_timeout())
            .window_size(width, height)
            .user_data_dir(user_data_dir)
            .args(settings.args.iter().cloned());

        if !settings.headless {
            builder = builder.with_head();
        }
        if sandbox_disabled() {
            builder = builder.no_sandbox();
        }
        if let Some(path) = settings.resolve_executable() {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|reason| {
            AutomationError::new(
                AutomationErrorKind::Launch,
                format!("invalid browser configuration: {reason}"),
            )
        })
    }
}

#[async_trait]
impl PageLauncher for ChromeLauncher {
    type Page = CdpPage;

    async fn launch(&self) -> Result<CdpPage, AutomationError> {
        debug!(settings = ?self.settings, "Launching browser");
        // Separate profile per launch so parallel runs do not share a singleton lock
        let profile = profile_dir()?;
        let config = self.browser_config(profile.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| with_kind(AutomationErrorKind::Launch, "launch", err))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!("Browser handler error: {}", err);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                handler_task.abort();
                return Err(with_kind(AutomationErrorKind::Launch, "new page", err));
            }
        };

        info!(
            headless = self.settings.headless,
            profile = %profile.path().display(),
            "Browser launched"
        );
        Ok(CdpPage::new(page, browser, profile, handler_task))
    }
}

fn profile_dir() -> Result<TempDir, AutomationError> {
    tempfile::Builder::new()
        .prefix("storecheck-")
        .tempdir()
        .map_err(|err| {
            AutomationError::new(
                AutomationErrorKind::Launch,
                format!("cannot create browser profile directory: {err}"),
            )
        })
}
