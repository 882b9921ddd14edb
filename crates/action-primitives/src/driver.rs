//! Interaction driver: registry-resolved waits and resilient actions

use crate::{
    errors::ActionError,
    page::{AutomationError, AutomationPage},
    types::*,
    waiting::{wait_until, WaitConfig, WaitFailure},
};
use action_locator::{LocatorRegistry, ResolvedSelector};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Drives a single page through symbolic element keys.
///
/// The registry is injected at construction and shared read-only; the page is
/// owned exclusively. Every wait is bounded by an explicit timeout.
pub struct InteractionDriver<P: AutomationPage> {
    registry: Arc<LocatorRegistry>,
    page: P,
    wait: WaitConfig,
    records: Mutex<Vec<InteractionRecord>>,
}

impl<P: AutomationPage> InteractionDriver<P> {
    pub fn new(registry: Arc<LocatorRegistry>, page: P, wait: WaitConfig) -> Self {
        Self {
            registry,
            page,
            wait,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<LocatorRegistry> {
        &self.registry
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.wait
    }

    /// Resolve a key through the registry
    pub fn resolve(&self, key: &str) -> Result<ResolvedSelector, ActionError> {
        Ok(self.registry.resolve(key)?)
    }

    /// Wait until the element(s) behind `key` satisfy `condition`.
    ///
    /// Returns every matching element for `AllVisible` and the first match
    /// otherwise. The returned list is never empty.
    pub async fn wait_until_ready(
        &self,
        key: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<Vec<Located<P::Element>>, ActionError> {
        let selector = self.resolve(key)?;
        let started = Instant::now();
        debug!(key, %selector, %condition, timeout_ms = timeout.as_millis() as u64, "Waiting for element");

        let page = &self.page;
        let probe_selector = &selector;
        let result = wait_until(timeout, self.wait.poll_interval(), || async move {
            probe_condition(page, probe_selector, condition).await
        })
        .await;

        match result {
            Ok(elements) => {
                debug!(
                    key,
                    count = elements.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Element ready"
                );
                Ok(elements
                    .into_iter()
                    .map(|element| Located {
                        key: key.to_string(),
                        selector: selector.clone(),
                        element,
                    })
                    .collect())
            }
            Err(WaitFailure::TimedOut) => {
                warn!(key, %selector, %condition, "Wait timed out");
                Err(ActionError::InteractionTimeout {
                    key: key.to_string(),
                    condition,
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(WaitFailure::Failed(error)) => Err(ActionError::Interaction {
                key: key.to_string(),
                error,
            }),
        }
    }

    /// [`wait_until_ready`](Self::wait_until_ready) returning the first match
    pub async fn wait_for(
        &self,
        key: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<Located<P::Element>, ActionError> {
        self.wait_until_ready(key, condition, timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ActionError::Interaction {
                key: key.to_string(),
                error: AutomationError::not_found("wait returned no elements"),
            })
    }

    /// [`wait_for`](Self::wait_for) with the configured default timeout
    pub async fn wait_default(
        &self,
        key: &str,
        condition: WaitCondition,
    ) -> Result<Located<P::Element>, ActionError> {
        self.wait_for(key, condition, self.wait.timeout()).await
    }

    /// Run one action on a located element
    pub async fn perform(
        &self,
        located: &Located<P::Element>,
        action: &ElementAction,
    ) -> Result<(), AutomationError> {
        let element = &located.element;
        match action {
            ElementAction::Click => self.page.click(element).await,
            ElementAction::ScriptClick => self.page.run_script(element, SCRIPT_CLICK).await.map(drop),
            ElementAction::ScrollIntoView => self
                .page
                .run_script(element, SCROLL_INTO_VIEW)
                .await
                .map(drop),
            ElementAction::Script(function) => {
                self.page.run_script(element, function).await.map(drop)
            }
        }
    }

    /// Run `primary`; on an interaction error run `fallback` once instead.
    ///
    /// The fallback runs only when the primary fails with an interaction
    /// error (obstructed, not interactable, stale). Other primary failures and
    /// fallback failures are surfaced.
    pub async fn act_with_fallback(
        &self,
        located: &Located<P::Element>,
        primary: ElementAction,
        fallback: ElementAction,
    ) -> Result<ActionOutcome, ActionError> {
        let key = located.key.as_str();
        match self.perform(located, &primary).await {
            Ok(()) => {
                debug!(key, action = %primary, "Primary action succeeded");
                Ok(ActionOutcome::Primary)
            }
            Err(err) if err.is_interaction() => {
                warn!(
                    key,
                    primary = %primary,
                    fallback = %fallback,
                    error = %err,
                    "Primary action failed; running fallback"
                );
                self.record(InteractionRecord::new(
                    key,
                    InteractionEvent::FallbackUsed {
                        primary: primary.name().to_string(),
                        fallback: fallback.name().to_string(),
                        primary_error: err.to_string(),
                    },
                ));
                self.perform(located, &fallback)
                    .await
                    .map_err(|error| ActionError::Interaction {
                        key: key.to_string(),
                        error,
                    })?;
                Ok(ActionOutcome::Fallback {
                    primary_error: err.to_string(),
                })
            }
            Err(error) => Err(ActionError::Interaction {
                key: key.to_string(),
                error,
            }),
        }
    }

    /// Centre the element in the viewport
    pub async fn scroll_into_view(&self, located: &Located<P::Element>) -> Result<(), ActionError> {
        self.perform(located, &ElementAction::ScrollIntoView)
            .await
            .map_err(|error| ActionError::Interaction {
                key: located.key.clone(),
                error,
            })
    }

    /// Native click with a scripted click as fallback
    pub async fn click_with_fallback(
        &self,
        located: &Located<P::Element>,
    ) -> Result<ActionOutcome, ActionError> {
        self.act_with_fallback(located, ElementAction::Click, ElementAction::ScriptClick)
            .await
    }

    /// Handle an element that may never appear.
    ///
    /// A timeout is an expected outcome and comes back as
    /// [`Tolerated::Absent`]. Lookup errors and a failing action on an element
    /// that did appear are still returned as errors.
    pub async fn tolerate_absence(
        &self,
        key: &str,
        action: ElementAction,
        timeout: Duration,
    ) -> Result<Tolerated, ActionError> {
        let located = match self.wait_for(key, WaitCondition::Clickable, timeout).await {
            Ok(located) => located,
            Err(ActionError::InteractionTimeout { timeout_ms, .. }) => {
                warn!(key, timeout_ms, "Optional element not found; continuing");
                self.record(InteractionRecord::new(
                    key,
                    InteractionEvent::Absent { timeout_ms },
                ));
                return Ok(Tolerated::Absent { timeout_ms });
            }
            Err(err) => return Err(err),
        };

        self.perform(&located, &action)
            .await
            .map_err(|error| ActionError::Interaction {
                key: key.to_string(),
                error,
            })?;
        info!(key, action = %action, "Optional element handled");
        self.record(InteractionRecord::new(
            key,
            InteractionEvent::Handled {
                action: action.name().to_string(),
            },
        ));
        Ok(Tolerated::Performed {
            action: action.name().to_string(),
        })
    }

    pub async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        info!(url, "Navigating");
        self.page.navigate(url).await?;
        Ok(())
    }

    pub async fn type_text(
        &self,
        located: &Located<P::Element>,
        text: &str,
        submit: bool,
    ) -> Result<(), ActionError> {
        self.page
            .send_keys(&located.element, text, submit)
            .await
            .map_err(|error| ActionError::Interaction {
                key: located.key.clone(),
                error,
            })
    }

    pub async fn read_text(&self, located: &Located<P::Element>) -> Result<String, ActionError> {
        self.page
            .text(&located.element)
            .await
            .map_err(|error| ActionError::Interaction {
                key: located.key.clone(),
                error,
            })
    }

    pub async fn current_url(&self) -> Result<String, ActionError> {
        Ok(self.page.current_url().await?)
    }

    /// Wait until the page URL contains `fragment`; returns the matching URL
    pub async fn wait_for_url(&self, fragment: &str, timeout: Duration) -> Result<String, ActionError> {
        let page = &self.page;
        let last_seen: Mutex<Option<String>> = Mutex::new(None);
        let seen = &last_seen;
        let result = wait_until(timeout, self.wait.poll_interval(), || async move {
            let url = page.current_url().await?;
            if url.contains(fragment) {
                return Ok(Some(url));
            }
            *seen.lock() = Some(url);
            Ok(None)
        })
        .await;

        match result {
            Ok(url) => Ok(url),
            Err(WaitFailure::TimedOut) => {
                // Last polled value only; the page may be unresponsive.
                let last = last_seen
                    .into_inner()
                    .unwrap_or_else(|| "<not read>".to_string());
                warn!(fragment, url = %last, "URL wait timed out");
                Err(ActionError::WaitTimeout {
                    description: format!("URL containing '{}' (last URL: {})", fragment, last),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(WaitFailure::Failed(err)) => Err(err.into()),
        }
    }

    /// Interaction log so far
    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().clone()
    }

    /// Release the page
    pub async fn quit(&self) -> Result<(), ActionError> {
        self.page.quit().await?;
        Ok(())
    }

    fn record(&self, record: InteractionRecord) {
        self.records.lock().push(record);
    }
}

async fn probe_condition<P: AutomationPage>(
    page: &P,
    selector: &ResolvedSelector,
    condition: WaitCondition,
) -> Result<Option<Vec<P::Element>>, AutomationError> {
    if condition == WaitCondition::AllVisible {
        let elements = page.find_all_elements(selector).await?;
        if elements.is_empty() {
            return Ok(None);
        }
        for element in &elements {
            if !page.is_displayed(element).await? {
                return Ok(None);
            }
        }
        return Ok(Some(elements));
    }

    let Some(element) = page.find_element(selector).await? else {
        return Ok(None);
    };

    let ready = match condition {
        WaitCondition::Present => true,
        WaitCondition::Visible => page.is_displayed(&element).await?,
        WaitCondition::Clickable => {
            page.is_displayed(&element).await? && page.is_enabled(&element).await?
        }
        WaitCondition::AllVisible => page.is_displayed(&element).await?,
    };

    Ok(ready.then(|| vec![element]))
}
