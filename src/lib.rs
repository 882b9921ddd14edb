//! storecheck library
//!
//! Exposes the CLI and configuration for the binary and integration tests

pub mod cli;
pub mod config;

pub use config::Config;
