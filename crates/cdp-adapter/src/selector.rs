//! Resolved selector to CDP query translation

use action_locator::{ResolvedSelector, StrategyType};

/// How a selector is sent to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdpQuery {
    /// `DOM.querySelectorAll`
    Css(String),
    /// `DOM.performSearch` with an XPath expression
    XPath(String),
}

impl CdpQuery {
    pub fn from_selector(selector: &ResolvedSelector) -> Self {
        match selector.strategy {
            StrategyType::Id => CdpQuery::Css(id_to_css(&selector.value)),
            StrategyType::Css => CdpQuery::Css(selector.value.clone()),
            StrategyType::XPath => CdpQuery::XPath(selector.value.clone()),
        }
    }
}

/// Attribute selector, so ids that are not valid CSS identifiers still match
fn id_to_css(id: &str) -> String {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[id=\"{escaped}\"]")
}
