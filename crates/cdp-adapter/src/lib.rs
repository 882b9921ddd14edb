//! Chromium DevTools Protocol backend
//!
//! Implements the `action_primitives` page capability on top of
//! `chromiumoxide`: launching Chrome, mapping registry selectors to CDP
//! queries and translating protocol failures into automation error kinds.

pub mod config;
pub mod errors;
pub mod launcher;
pub mod page;
pub mod selector;

pub use config::{BrowserSettings, CHROME_PATH_ENV, DISABLE_SANDBOX_ENV};
pub use launcher::ChromeLauncher;
pub use page::CdpPage;
pub use selector::CdpQuery;
