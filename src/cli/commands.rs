use clap::Subcommand;

use super::locators::LocatorsArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the storefront shopping check in a real browser
    Run(RunArgs),

    /// Inspect and validate locator definitions
    Locators(LocatorsArgs),

    /// Show version and build information
    Info,
}
