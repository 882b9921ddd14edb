//! Shopping-flow scenario as a typestate machine

use crate::config::ScenarioConfig;
use crate::errors::{FlowError, ScenarioAborted};
use crate::keys;
use crate::report::RunReport;
use crate::state::*;
use action_locator::LocatorRegistry;
use action_primitives::{
    AutomationPage, ElementAction, InteractionDriver, PageLauncher, Tolerated, WaitCondition,
    WaitConfig,
};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Entry point: configuration plus the shared locator registry
#[derive(Clone)]
pub struct ShoppingScenario {
    config: Arc<ScenarioConfig>,
    registry: Arc<LocatorRegistry>,
    wait: WaitConfig,
}

impl ShoppingScenario {
    pub fn new(config: ScenarioConfig, registry: Arc<LocatorRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Launch a browser session: `NotStarted -> BrowserReady`
    pub async fn open_browser<L: PageLauncher>(
        &self,
        launcher: &L,
    ) -> Result<ScenarioRun<L::Page, BrowserReady>, ScenarioAborted> {
        let started = Instant::now();
        let mut report = RunReport::new();
        info!(run_id = %report.run_id, "Launching browser");

        let page = match launcher.launch().await {
            Ok(page) => page,
            Err(err) => {
                error!(run_id = %report.run_id, error = %err, "Browser launch failed");
                report.error = Some(err.to_string());
                report.finish(Vec::new(), false);
                return Err(ScenarioAborted {
                    state: ScenarioState::NotStarted,
                    step: "open_browser".to_string(),
                    error: FlowError::Launch(err),
                    report: Box::new(report),
                });
            }
        };

        report.record_step(
            "open_browser",
            BrowserReady::STATE,
            started.elapsed().as_millis() as u64,
        );

        Ok(ScenarioRun {
            driver: InteractionDriver::new(Arc::clone(&self.registry), page, self.wait),
            config: Arc::clone(&self.config),
            report,
            _state: PhantomData,
        })
    }

    /// Run every step in order and close the browser
    pub async fn run<L: PageLauncher>(&self, launcher: &L) -> Result<RunReport, ScenarioAborted> {
        let term = self.config.search_term.clone();
        let run = self
            .open_browser(launcher)
            .await?
            .goto_storefront()
            .await?
            .search(&term)
            .await?
            .verify_results()
            .await?
            .add_first_item_to_cart()
            .await?
            .checkout()
            .await?
            .verify_auth_redirect()
            .await?;
        Ok(run.close().await)
    }
}

/// A live scenario run in state `S`.
///
/// Each step consumes the run and yields the next state. A failing step quits
/// the page and returns [`ScenarioAborted`].
///
/// Steps are only available on the state that precedes them:
///
/// ```no_run
/// use action_flow::{BrowserReady, ScenarioRun};
/// use action_primitives::AutomationPage;
///
/// async fn first_step<P: AutomationPage>(run: ScenarioRun<P, BrowserReady>) {
///     let _ = run.goto_storefront().await;
/// }
/// ```
///
/// Skipping ahead does not compile:
///
/// ```compile_fail
/// use action_flow::{BrowserReady, ScenarioRun};
/// use action_primitives::AutomationPage;
///
/// async fn skip_to_checkout<P: AutomationPage>(run: ScenarioRun<P, BrowserReady>) {
///     let _ = run.checkout().await;
/// }
/// ```
///
/// Nor does reusing a run after a step consumed it:
///
/// ```compile_fail
/// use action_flow::{BrowserReady, ScenarioRun};
/// use action_primitives::AutomationPage;
///
/// async fn step_twice<P: AutomationPage>(run: ScenarioRun<P, BrowserReady>) {
///     let _ = run.goto_storefront().await;
///     let _ = run.goto_storefront().await;
/// }
/// ```
pub struct ScenarioRun<P: AutomationPage, S: StateMarker> {
    driver: InteractionDriver<P>,
    config: Arc<ScenarioConfig>,
    report: RunReport,
    _state: PhantomData<S>,
}

impl<P: AutomationPage, S: StateMarker> ScenarioRun<P, S> {
    pub fn state(&self) -> ScenarioState {
        S::STATE
    }

    pub fn driver(&self) -> &InteractionDriver<P> {
        &self.driver
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Quit the browser and return the final report. Quit failures are logged.
    pub async fn close(mut self) -> RunReport {
        info!(run_id = %self.report.run_id, state = %S::STATE, "Closing browser");
        let closed = self.release().await;
        let interactions = self.driver.records();
        self.report.finish(interactions, closed);
        info!(
            run_id = %self.report.run_id,
            final_state = %self.report.final_state,
            fallbacks = self.report.fallback_count(),
            "Scenario finished"
        );
        self.report
    }

    /// Quit the page; a clean quit is recorded as the `Closed` step
    async fn release(&mut self) -> bool {
        let started = Instant::now();
        match self.driver.quit().await {
            Ok(()) => {
                self.report.record_close(started.elapsed().as_millis() as u64);
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to quit browser");
                false
            }
        }
    }

    async fn settle(&self) {
        sleep(self.config.settle()).await;
    }

    async fn advance<T: StateMarker>(
        self,
        step: &str,
        started: Instant,
        outcome: Result<(), FlowError>,
    ) -> Result<ScenarioRun<P, T>, ScenarioAborted> {
        match outcome {
            Ok(()) => {
                let ScenarioRun {
                    driver,
                    config,
                    mut report,
                    ..
                } = self;
                report.record_step(step, T::STATE, started.elapsed().as_millis() as u64);
                info!(step, state = %T::STATE, "Step completed");
                Ok(ScenarioRun {
                    driver,
                    config,
                    report,
                    _state: PhantomData,
                })
            }
            Err(err) => Err(self.abort(step, err).await),
        }
    }

    async fn abort(mut self, step: &str, err: FlowError) -> ScenarioAborted {
        error!(step, state = %S::STATE, error = %err, "Step failed");
        let closed = self.release().await;
        let interactions = self.driver.records();
        self.report.error = Some(err.to_string());
        self.report.finish(interactions, closed);
        ScenarioAborted {
            state: S::STATE,
            step: step.to_string(),
            error: err,
            report: Box::new(self.report),
        }
    }

    /// Wait clickable, optionally scroll, click with script fallback
    async fn click_key(&self, key: &str, scroll_first: bool) -> Result<(), FlowError> {
        let located = self
            .driver
            .wait_default(key, WaitCondition::Clickable)
            .await?;
        if scroll_first {
            self.driver.scroll_into_view(&located).await?;
        }
        let outcome = self.driver.click_with_fallback(&located).await?;
        info!(key, fallback = outcome.used_fallback(), "Clicked");
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, BrowserReady> {
    /// Open the storefront and dismiss the cookie banner if one shows up
    pub async fn goto_storefront(self) -> Result<ScenarioRun<P, OnTargetPage>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.load_storefront().await;
        self.advance("goto_storefront", started, outcome).await
    }

    async fn load_storefront(&self) -> Result<(), FlowError> {
        self.driver.navigate(&self.config.base_url).await?;
        let banner = self
            .driver
            .tolerate_absence(
                keys::BTN_ACCEPT_COOKIES,
                ElementAction::Click,
                self.config.cookie_timeout(),
            )
            .await?;
        if let Tolerated::Performed { .. } = banner {
            info!("Cookie banner closed");
        }
        self.settle().await;
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, OnTargetPage> {
    /// Type `term` into the search box and submit
    pub async fn search(
        self,
        term: &str,
    ) -> Result<ScenarioRun<P, SearchSubmitted>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.submit_search(term).await;
        self.advance("search", started, outcome).await
    }

    async fn submit_search(&self, term: &str) -> Result<(), FlowError> {
        info!(term, "Searching");
        let search_box = self
            .driver
            .wait_default(keys::TXT_SEARCHBOX, WaitCondition::Clickable)
            .await?;
        self.driver.click_with_fallback(&search_box).await?;
        self.driver.type_text(&search_box, term, true).await?;
        self.settle().await;
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, SearchSubmitted> {
    /// Results heading must mention the expected text
    pub async fn verify_results(self) -> Result<ScenarioRun<P, ResultVerified>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.check_results_heading().await;
        self.advance("verify_results", started, outcome).await
    }

    async fn check_results_heading(&self) -> Result<(), FlowError> {
        let header = self
            .driver
            .wait_default(keys::LABEL_HEADER, WaitCondition::Visible)
            .await?;
        let text = self.driver.read_text(&header).await?;
        info!(header = %text, "Search result header");

        let expected = &self.config.expected_heading;
        if !text.to_lowercase().contains(&expected.to_lowercase()) {
            return Err(FlowError::AssertionFailed {
                step: "verify_results".to_string(),
                expected: format!("heading containing '{expected}'"),
                actual: text,
            });
        }
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, ResultVerified> {
    /// Open the first result tile, then the cart
    pub async fn add_first_item_to_cart(
        self,
    ) -> Result<ScenarioRun<P, ItemInCart>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.open_first_item_and_cart().await;
        self.advance("add_first_item_to_cart", started, outcome).await
    }

    async fn open_first_item_and_cart(&self) -> Result<(), FlowError> {
        let prices = self
            .driver
            .wait_until_ready(
                keys::LABEL_FIRST_PRODUCT_PRICE,
                WaitCondition::AllVisible,
                self.driver.wait_config().timeout(),
            )
            .await?;
        let Some(first) = prices.first() else {
            return Err(FlowError::AssertionFailed {
                step: "add_first_item_to_cart".to_string(),
                expected: "at least one product price".to_string(),
                actual: "none".to_string(),
            });
        };

        self.driver.scroll_into_view(first).await?;
        let outcome = self.driver.click_with_fallback(first).await?;
        info!(fallback = outcome.used_fallback(), "First product clicked");
        self.settle().await;

        self.click_key(keys::BTN_CART, false).await?;
        self.settle().await;
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, ItemInCart> {
    /// Press "complete shopping" on the cart page
    pub async fn checkout(self) -> Result<ScenarioRun<P, CheckoutInitiated>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.complete_shopping().await;
        self.advance("checkout", started, outcome).await
    }

    async fn complete_shopping(&self) -> Result<(), FlowError> {
        self.click_key(keys::BTN_COMPLETE_SHOPPING, true).await?;
        self.settle().await;
        Ok(())
    }
}

impl<P: AutomationPage> ScenarioRun<P, CheckoutInitiated> {
    /// Checkout must land on the login page
    pub async fn verify_auth_redirect(
        self,
    ) -> Result<ScenarioRun<P, AuthRedirectVerified>, ScenarioAborted> {
        let started = Instant::now();
        let outcome = self.confirm_login_page().await;
        self.advance("verify_auth_redirect", started, outcome).await
    }

    async fn confirm_login_page(&self) -> Result<(), FlowError> {
        let timeout = self.config.login_timeout();
        let url = self
            .driver
            .wait_for_url(&self.config.login_url_fragment, timeout)
            .await?;
        info!(url = %url, "Redirected to login");

        let login = self
            .driver
            .wait_for(keys::BTN_LOGIN, WaitCondition::Visible, timeout)
            .await?;
        let text = self.driver.read_text(&login).await?;
        info!(button = %text.trim(), "Login screen confirmed");
        Ok(())
    }
}
