//! Core types for the locator registry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector strategy enumeration
///
/// Defines the selector kinds the registry can hand to a browser:
/// - Id: element id attribute
/// - Css: CSS selector
/// - XPath: XPath expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    /// Element id strategy
    Id,

    /// CSS selector strategy
    Css,

    /// XPath expression strategy
    #[serde(rename = "xpath")]
    XPath,
}

impl StrategyType {
    /// Get strategy name as it appears in locator sources
    pub fn name(&self) -> &'static str {
        match self {
            StrategyType::Id => "id",
            StrategyType::Css => "css",
            StrategyType::XPath => "xpath",
        }
    }

    /// Parse a source `type` field. Matching is exact; `"CSS"` is not `css`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(StrategyType::Id),
            "css" => Some(StrategyType::Css),
            "xpath" => Some(StrategyType::XPath),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One named element reference as written in a locator source.
///
/// The strategy type is kept as the raw string so that unsupported kinds
/// load successfully and fail only when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorDefinition {
    /// Registry key used by scenario steps
    pub key: String,

    /// Selector payload, interpreted according to `strategy_type`
    pub value: String,

    /// Raw selector kind (`id`, `css`, `xpath`)
    #[serde(rename = "type")]
    pub strategy_type: String,
}

impl LocatorDefinition {
    /// Create a new definition
    pub fn new(
        key: impl Into<String>,
        strategy_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            strategy_type: strategy_type.into(),
        }
    }

    /// Parsed strategy, `None` when the type is unsupported
    pub fn strategy(&self) -> Option<StrategyType> {
        StrategyType::parse(&self.strategy_type)
    }
}

/// Selector descriptor ready for a browser "find" primitive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSelector {
    /// Selector kind
    pub strategy: StrategyType,

    /// Selector payload
    pub value: String,
}

impl ResolvedSelector {
    pub fn new(strategy: StrategyType, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(StrategyType::Id, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(StrategyType::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(StrategyType::XPath, value)
    }
}

impl fmt::Display for ResolvedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}
