pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod locators;
pub mod output;
pub mod run;
pub mod runtime;

pub use info::cmd_info;
pub use locators::{cmd_locators, LocatorsArgs};
pub use run::{cmd_run, RunArgs};
