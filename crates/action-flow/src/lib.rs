//! Shopping-flow scenario
//!
//! The end-to-end storefront check expressed as a typestate machine over the
//! interaction driver: open the storefront, search, verify results, add the
//! first item to the cart, check out and confirm the login redirect. Illegal
//! step orders do not compile, and every exit path releases the browser.

pub mod config;
pub mod errors;
pub mod keys;
pub mod report;
pub mod scenario;
pub mod state;

pub use config::ScenarioConfig;
pub use errors::{FlowError, ScenarioAborted};
pub use report::{RunReport, StepRecord};
pub use scenario::{ScenarioRun, ShoppingScenario};
pub use state::*;
