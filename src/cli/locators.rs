use std::path::PathBuf;

use action_locator::{LocatorDefinition, ResolvedSelector};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct LocatorsArgs {
    /// Locator source file (JSON or YAML)
    #[arg(long, value_name = "PATH", global = true)]
    pub locators: Option<PathBuf>,

    #[command(subcommand)]
    pub command: LocatorsCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum LocatorsCommand {
    /// List every definition, sorted by key
    List,

    /// Fail if any definition uses an unsupported selector type
    Check,

    /// Show the selector a key resolves to
    Resolve {
        /// Registry key
        key: String,
    },
}

#[derive(Serialize)]
struct Listing<'a> {
    origin: &'a str,
    definitions: Vec<&'a LocatorDefinition>,
}

#[derive(Serialize)]
struct CheckReport {
    origin: String,
    checked: usize,
    problems: Vec<String>,
}

#[derive(Serialize)]
struct Resolution<'a> {
    key: &'a str,
    selector: ResolvedSelector,
}

pub async fn cmd_locators(args: LocatorsArgs, ctx: &CliContext) -> Result<()> {
    let registry = ctx.registry(args.locators).await?;
    let output = ctx.output();

    match args.command {
        LocatorsCommand::List => {
            let listing = Listing {
                origin: registry.origin(),
                definitions: registry.definitions(),
            };
            output.emit(&listing, |listing| {
                println!("Locators from {}", listing.origin);
                for def in &listing.definitions {
                    println!("  {:<28} {:<6} {}", def.key, def.strategy_type, def.value);
                }
            })
        }
        LocatorsCommand::Check => {
            let problems: Vec<String> = registry
                .validate()
                .into_iter()
                .map(|err| err.to_string())
                .collect();
            let report = CheckReport {
                origin: registry.origin().to_string(),
                checked: registry.len(),
                problems,
            };
            output.emit(&report, |report| {
                if report.problems.is_empty() {
                    println!("{} locator(s) in {} are valid", report.checked, report.origin);
                } else {
                    for problem in &report.problems {
                        println!("✗ {}", problem);
                    }
                }
            })?;
            if !report.problems.is_empty() {
                bail!(
                    "{} of {} locator definition(s) are invalid",
                    report.problems.len(),
                    report.checked
                );
            }
            Ok(())
        }
        LocatorsCommand::Resolve { key } => {
            let selector = registry.resolve(&key)?;
            let resolution = Resolution {
                key: &key,
                selector,
            };
            output.emit(&resolution, |resolution| {
                println!("{} -> {}", resolution.key, resolution.selector);
            })
        }
    }
}
