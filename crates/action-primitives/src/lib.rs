//! Resilient interaction driver
//!
//! This crate sits between scenario steps and a browser-automation backend:
//! - `AutomationPage`: the capability a backend must provide
//! - Bounded wait-until-ready on present/clickable/visible/all-visible
//! - Primary action with a single scripted fallback
//! - Tolerated absence for optional UI such as consent banners
//!
//! Element names are symbolic keys resolved through `action_locator`.

pub mod driver;
pub mod errors;
pub mod page;
pub mod types;
mod waiting;

pub use driver::*;
pub use errors::*;
pub use page::*;
pub use types::*;
pub use waiting::*;
