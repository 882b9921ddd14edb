//! Chromium page implementing [`AutomationPage`]

use crate::errors::{from_cdp, with_kind};
use crate::selector::CdpQuery;
use action_locator::ResolvedSelector;
use action_primitives::{AutomationError, AutomationErrorKind, AutomationPage};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const DISPLAYED_PROBE: &str = "function() { \
    const style = window.getComputedStyle(this); \
    const rect = this.getBoundingClientRect(); \
    return style.visibility !== 'hidden' && style.display !== 'none' \
        && rect.width > 0 && rect.height > 0; }";

const ENABLED_PROBE: &str = "function() { return !this.disabled; }";

/// Returns null when a click at the element's centre lands on the element
/// (or a descendant), otherwise a short description of the element on top.
const HIT_TEST: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2); \
    if (!hit || this === hit || this.contains(hit)) { return null; } \
    return hit.tagName.toLowerCase() + (hit.id ? '#' + hit.id : ''); }";

/// One Chromium tab plus the browser process and profile directory it owns.
///
/// `quit()` closes the browser and removes the profile; dropping without it
/// leaves cleanup to chromiumoxide's own `Drop` and then `TempDir`'s.
pub struct CdpPage {
    page: Page,
    browser: Mutex<Option<Browser>>,
    // Declared after `browser` so the process is gone before the directory is removed.
    profile: Mutex<Option<TempDir>>,
    profile_path: PathBuf,
    handler: JoinHandle<()>,
}

impl CdpPage {
    pub(crate) fn new(
        page: Page,
        browser: Browser,
        profile: TempDir,
        handler: JoinHandle<()>,
    ) -> Self {
        Self {
            page,
            browser: Mutex::new(Some(browser)),
            profile_path: profile.path().to_path_buf(),
            profile: Mutex::new(Some(profile)),
            handler,
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.browser.lock().await.is_none()
    }

    /// Chrome user-data directory for this session; removed by `quit()`
    pub fn profile_dir(&self) -> &Path {
        &self.profile_path
    }

    async fn probe(&self, element: &Element, function: &str) -> Result<bool, AutomationError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(|err| from_cdp("probe", err))?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl AutomationPage for CdpPage {
    type Element = Arc<Element>;

    async fn navigate(&self, url: &str) -> Result<(), AutomationError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| with_kind(AutomationErrorKind::Navigation, "navigate", err))?;
        Ok(())
    }

    async fn find_element(
        &self,
        selector: &ResolvedSelector,
    ) -> Result<Option<Self::Element>, AutomationError> {
        Ok(self.find_all_elements(selector).await?.into_iter().next())
    }

    async fn find_all_elements(
        &self,
        selector: &ResolvedSelector,
    ) -> Result<Vec<Self::Element>, AutomationError> {
        let found = match CdpQuery::from_selector(selector) {
            CdpQuery::Css(css) => self.page.find_elements(css).await,
            CdpQuery::XPath(xpath) => self.page.find_xpaths(xpath).await,
        };
        match found {
            Ok(elements) => Ok(elements.into_iter().map(Arc::new).collect()),
            Err(err) => {
                let err = from_cdp("find", err);
                if err.kind == AutomationErrorKind::NotFound {
                    debug!(%selector, "No element matched");
                    Ok(Vec::new())
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, AutomationError> {
        self.probe(element, DISPLAYED_PROBE).await
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, AutomationError> {
        self.probe(element, ENABLED_PROBE).await
    }

    async fn click(&self, element: &Self::Element) -> Result<(), AutomationError> {
        // Mouse events go to whatever is on top, so check before dispatching them.
        element
            .scroll_into_view()
            .await
            .map_err(|err| from_cdp("scroll", err))?;
        let hit = element
            .call_js_fn(HIT_TEST, false)
            .await
            .map_err(|err| from_cdp("hit test", err))?;
        if let Some(err) = obstruction(hit.result.value) {
            return Err(err);
        }

        element.click().await.map_err(|err| from_cdp("click", err))?;
        Ok(())
    }

    async fn run_script(
        &self,
        element: &Self::Element,
        function: &str,
    ) -> Result<Value, AutomationError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(|err| with_kind(AutomationErrorKind::Script, "script", err))?;
        if let Some(details) = returns.exception_details {
            return Err(AutomationError::new(
                AutomationErrorKind::Script,
                format!("script threw: {}", details.text),
            ));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }

    async fn text(&self, element: &Self::Element) -> Result<String, AutomationError> {
        Ok(element
            .inner_text()
            .await
            .map_err(|err| from_cdp("text", err))?
            .unwrap_or_default())
    }

    async fn send_keys(
        &self,
        element: &Self::Element,
        text: &str,
        submit: bool,
    ) -> Result<(), AutomationError> {
        element
            .focus()
            .await
            .map_err(|err| from_cdp("focus", err))?
            .type_str(text)
            .await
            .map_err(|err| from_cdp("type", err))?;
        if submit {
            element
                .press_key("Enter")
                .await
                .map_err(|err| from_cdp("submit", err))?;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AutomationError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(|err| from_cdp("url", err))?
            .unwrap_or_default())
    }

    async fn quit(&self) -> Result<(), AutomationError> {
        let mut guard = self.browser.lock().await;
        let Some(mut browser) = guard.take() else {
            return Ok(());
        };

        debug!("Closing browser");
        let closed = browser
            .close()
            .await
            .map_err(|err| with_kind(AutomationErrorKind::Transport, "close", err));
        if let Err(err) = browser.wait().await {
            warn!(error = %err, "Browser process did not exit cleanly");
        }
        self.handler.abort();

        if let Some(profile) = self.profile.lock().await.take() {
            if let Err(err) = profile.close() {
                warn!(path = %self.profile_path.display(), error = %err, "Failed to remove browser profile");
            }
        }
        closed.map(drop)
    }
}

/// Map a [`HIT_TEST`] result to an `Obstructed` error
fn obstruction(hit: Option<Value>) -> Option<AutomationError> {
    match hit {
        Some(Value::String(covering)) => Some(AutomationError::new(
            AutomationErrorKind::Obstructed,
            format!("click: element is covered by <{covering}>"),
        )),
        _ => None,
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        let open = self
            .browser
            .try_lock()
            .map(|guard| guard.is_some())
            .unwrap_or(true);
        if open {
            warn!("CdpPage dropped without quit() - browser shut down via Drop");
        }
        self.handler.abort();
    }
}
