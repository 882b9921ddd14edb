use action_locator::{LocatorRegistry, ResolvedSelector};
use action_primitives::{
    ActionError, ActionOutcome, AutomationError, AutomationErrorKind, AutomationPage,
    ElementAction, InteractionDriver, InteractionEvent, Tolerated, WaitCondition, WaitConfig,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_test::assert_ok;

const LOCATORS: &str = r##"[
  { "key": "search_box", "type": "css", "value": "#q" },
  { "key": "cookie_banner", "type": "id", "value": "consent" },
  { "key": "prices", "type": "css", "value": ".price" },
  { "key": "cart", "type": "xpath", "value": "//a[@id='cart']" },
  { "key": "bad", "type": "regex", "value": ".*" }
]"##;

#[derive(Clone, Default)]
struct Node {
    displayed: bool,
    enabled: bool,
    click_error: Option<AutomationError>,
    script_error: Option<AutomationError>,
    text: String,
    visible_after: Option<Duration>,
}

impl Node {
    fn ready() -> Self {
        Self {
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Calls {
    clicks: usize,
    scripts: Vec<String>,
    typed: Vec<(String, bool)>,
    quit: bool,
}

struct FakePage {
    nodes: HashMap<String, Vec<Node>>,
    created: Instant,
    url: Mutex<String>,
    url_delay: Option<Duration>,
    calls: Mutex<Calls>,
}

impl FakePage {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            created: Instant::now(),
            url: Mutex::new("about:blank".to_string()),
            url_delay: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    fn with(mut self, selector: &str, nodes: Vec<Node>) -> Self {
        self.nodes.insert(selector.to_string(), nodes);
        self
    }

    fn with_slow_url(mut self, delay: Duration) -> Self {
        self.url_delay = Some(delay);
        self
    }

    fn node(&self, handle: &(String, usize)) -> &Node {
        &self.nodes[&handle.0][handle.1]
    }
}

#[async_trait]
impl AutomationPage for FakePage {
    type Element = (String, usize);

    async fn navigate(&self, url: &str) -> Result<(), AutomationError> {
        *self.url.lock().unwrap() = url.to_string();
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
        Ok(self
            .nodes
            .get(&selector.value)
            .map(|nodes| {
                (0..nodes.len())
                    .map(|index| (selector.value.clone(), index))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, AutomationError> {
        let node = self.node(element);
        let delayed = node
            .visible_after
            .map(|delay| self.created.elapsed() < delay)
            .unwrap_or(false);
        Ok(node.displayed && !delayed)
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, AutomationError> {
        Ok(self.node(element).enabled)
    }

    async fn click(&self, element: &Self::Element) -> Result<(), AutomationError> {
        self.calls.lock().unwrap().clicks += 1;
        match &self.node(element).click_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn run_script(
        &self,
        element: &Self::Element,
        function: &str,
    ) -> Result<Value, AutomationError> {
        self.calls.lock().unwrap().scripts.push(function.to_string());
        match &self.node(element).script_error {
            Some(err) => Err(err.clone()),
            None => Ok(Value::Null),
        }
    }

    async fn text(&self, element: &Self::Element) -> Result<String, AutomationError> {
        Ok(self.node(element).text.clone())
    }

    async fn send_keys(
        &self,
        _element: &Self::Element,
        text: &str,
        submit: bool,
    ) -> Result<(), AutomationError> {
        self.calls
            .lock()
            .unwrap()
            .typed
            .push((text.to_string(), submit));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AutomationError> {
        if let Some(delay) = self.url_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.url.lock().unwrap().clone())
    }

    async fn quit(&self) -> Result<(), AutomationError> {
        self.calls.lock().unwrap().quit = true;
        Ok(())
    }
}

fn driver(page: FakePage) -> InteractionDriver<FakePage> {
    let registry = Arc::new(LocatorRegistry::from_json_str(LOCATORS).unwrap());
    InteractionDriver::new(
        registry,
        page,
        WaitConfig::new(Duration::from_millis(500), Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn wait_resolves_key_before_finding() {
    let driver = driver(FakePage::new().with("#q", vec![Node::ready()]));

    let located = driver
        .wait_for("search_box", WaitCondition::Clickable, Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(located.key, "search_box");
    assert_eq!(located.selector, ResolvedSelector::css("#q"));
}

#[tokio::test]
async fn wait_on_unknown_or_unsupported_key_fails_fast() {
    let driver = driver(FakePage::new());
    let start = Instant::now();

    let err = driver
        .wait_for("missing", WaitCondition::Present, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_config());

    let err = driver
        .wait_for("bad", WaitCondition::Present, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_config());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn always_false_wait_times_out_within_slack() {
    let hidden = Node {
        displayed: false,
        enabled: true,
        ..Node::default()
    };
    let driver = driver(FakePage::new().with("#q", vec![hidden]));
    let timeout = Duration::from_millis(250);
    let start = Instant::now();

    let err = driver
        .wait_for("search_box", WaitCondition::Visible, timeout)
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    match err {
        ActionError::InteractionTimeout {
            key,
            condition,
            selector,
            timeout_ms,
        } => {
            assert_eq!(key, "search_box");
            assert_eq!(condition, WaitCondition::Visible);
            assert_eq!(selector, "css=#q");
            assert_eq!(timeout_ms, 250);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + Duration::from_millis(150));
}

#[tokio::test]
async fn clickable_requires_enabled() {
    let disabled = Node {
        displayed: true,
        enabled: false,
        ..Node::default()
    };
    let driver = driver(FakePage::new().with("#q", vec![disabled]));

    assert!(driver
        .wait_for("search_box", WaitCondition::Visible, Duration::from_millis(100))
        .await
        .is_ok());
    assert!(driver
        .wait_for("search_box", WaitCondition::Clickable, Duration::from_millis(100))
        .await
        .unwrap_err()
        .is_timeout());
}

#[tokio::test]
async fn all_visible_waits_for_every_match() {
    let late = Node {
        visible_after: Some(Duration::from_millis(80)),
        ..Node::ready()
    };
    let driver = driver(FakePage::new().with(".price", vec![Node::ready(), late]));

    let prices = driver
        .wait_until_ready("prices", WaitCondition::AllVisible, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[1].element, (".price".to_string(), 1));
}

#[tokio::test]
async fn fallback_not_used_when_primary_succeeds() {
    let driver = driver(FakePage::new().with("//a[@id='cart']", vec![Node::ready()]));
    let cart = driver
        .wait_for("cart", WaitCondition::Clickable, Duration::from_millis(100))
        .await
        .unwrap();

    let outcome = driver.click_with_fallback(&cart).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Primary);

    let calls = driver.page().calls.lock().unwrap();
    assert_eq!(calls.clicks, 1);
    assert!(calls.scripts.is_empty());
    drop(calls);
    assert!(driver.records().is_empty());
}

#[tokio::test]
async fn fallback_runs_once_after_interaction_error() {
    let covered = Node {
        click_error: Some(AutomationError::new(
            AutomationErrorKind::Obstructed,
            "element click intercepted",
        )),
        ..Node::ready()
    };
    let driver = driver(FakePage::new().with("//a[@id='cart']", vec![covered]));
    let cart = driver
        .wait_for("cart", WaitCondition::Clickable, Duration::from_millis(100))
        .await
        .unwrap();

    let outcome = driver.click_with_fallback(&cart).await.unwrap();
    assert!(outcome.used_fallback());

    let calls = driver.page().calls.lock().unwrap();
    assert_eq!(calls.clicks, 1);
    assert_eq!(calls.scripts, vec![action_primitives::SCRIPT_CLICK.to_string()]);
    drop(calls);

    let records = driver.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "cart");
    assert!(matches!(
        records[0].event,
        InteractionEvent::FallbackUsed { ref fallback, .. } if fallback == "script-click"
    ));
}

#[tokio::test]
async fn fallback_failure_is_surfaced() {
    let broken = Node {
        click_error: Some(AutomationError::not_interactable("zero size")),
        script_error: Some(AutomationError::new(
            AutomationErrorKind::Script,
            "click is not a function",
        )),
        ..Node::ready()
    };
    let driver = driver(FakePage::new().with("#q", vec![broken]));
    let search = driver
        .wait_for("search_box", WaitCondition::Present, Duration::from_millis(100))
        .await
        .unwrap();

    let err = driver.click_with_fallback(&search).await.unwrap_err();
    match err {
        ActionError::Interaction { key, error } => {
            assert_eq!(key, "search_box");
            assert_eq!(error.kind, AutomationErrorKind::Script);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_interaction_error_skips_fallback() {
    let gone = Node {
        click_error: Some(AutomationError::transport("websocket closed")),
        ..Node::ready()
    };
    let driver = driver(FakePage::new().with("#q", vec![gone]));
    let search = driver
        .wait_for("search_box", WaitCondition::Present, Duration::from_millis(100))
        .await
        .unwrap();

    let err = driver
        .act_with_fallback(&search, ElementAction::Click, ElementAction::ScriptClick)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Interaction { .. }));
    assert!(driver.page().calls.lock().unwrap().scripts.is_empty());
}

#[tokio::test]
async fn absent_banner_is_a_recorded_outcome() {
    let driver = driver(FakePage::new());

    let outcome = driver
        .tolerate_absence("cookie_banner", ElementAction::Click, Duration::from_millis(60))
        .await
        .unwrap();
    assert_eq!(outcome, Tolerated::Absent { timeout_ms: 60 });

    let records = driver.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].event,
        InteractionEvent::Absent { timeout_ms: 60 }
    );
}

#[tokio::test]
async fn present_banner_is_clicked() {
    let driver = driver(FakePage::new().with("consent", vec![Node::ready()]));

    let outcome = assert_ok!(
        driver
            .tolerate_absence("cookie_banner", ElementAction::Click, Duration::from_millis(200))
            .await
    );
    assert_eq!(
        outcome,
        Tolerated::Performed {
            action: "click".to_string()
        }
    );
    assert_eq!(driver.page().calls.lock().unwrap().clicks, 1);
}

#[tokio::test]
async fn tolerate_absence_still_rejects_unknown_keys() {
    let driver = driver(FakePage::new());
    let err = driver
        .tolerate_absence("not_registered", ElementAction::Click, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn url_wait_and_typing() {
    let driver = driver(FakePage::new().with("#q", vec![Node::ready()]));
    driver
        .navigate("https://giris.example.com/login?return=cart")
        .await
        .unwrap();

    let url = driver
        .wait_for_url("giris.example.com", Duration::from_millis(100))
        .await
        .unwrap();
    assert!(url.starts_with("https://giris.example.com"));

    let err = driver
        .wait_for_url("never.example.com", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::WaitTimeout { .. }));

    let search = driver
        .wait_for("search_box", WaitCondition::Clickable, Duration::from_millis(100))
        .await
        .unwrap();
    driver.type_text(&search, "bilgisayar", true).await.unwrap();
    driver.quit().await.unwrap();

    let calls = driver.page().calls.lock().unwrap();
    assert_eq!(calls.typed, vec![("bilgisayar".to_string(), true)]);
    assert!(calls.quit);
}

#[tokio::test]
async fn url_wait_is_bounded_when_page_hangs() {
    let driver = driver(FakePage::new().with_slow_url(Duration::from_secs(3)));
    let timeout = Duration::from_millis(100);
    let start = Instant::now();

    let err = driver.wait_for_url("login", timeout).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, ActionError::WaitTimeout { timeout_ms: 100, .. }));
    assert!(
        elapsed < timeout + Duration::from_millis(400),
        "wait of {timeout:?} took {elapsed:?}"
    );
}

#[tokio::test]
async fn url_wait_timeout_names_last_url_seen() {
    let driver = driver(FakePage::new());
    driver.navigate("https://shop.example.com/cart").await.unwrap();

    let err = driver
        .wait_for_url("login", Duration::from_millis(50))
        .await
        .unwrap_err();
    match err {
        ActionError::WaitTimeout { description, .. } => {
            assert!(description.contains("https://shop.example.com/cart"), "{description}");
        }
        other => panic!("expected wait timeout, got {other:?}"),
    }
}
