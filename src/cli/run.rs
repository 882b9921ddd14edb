use std::path::PathBuf;
use std::time::Duration;

use action_flow::{RunReport, ShoppingScenario};
use action_primitives::InteractionEvent;
use anyhow::{Error, Result};
use cdp_adapter::ChromeLauncher;
use clap::Args;
use humantime::format_duration;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Locator source file (JSON or YAML)
    #[arg(long, value_name = "PATH")]
    pub locators: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// Storefront URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Search term; also the text expected in the results heading
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let registry = ctx.registry(args.locators.clone()).await?;

    let mut scenario_config = config.scenario.clone();
    if let Some(url) = args.base_url {
        scenario_config.base_url = url;
    }
    if let Some(term) = args.search {
        scenario_config = scenario_config.with_search_term(term);
    }

    let mut browser = config.browser.clone();
    if args.headless {
        browser.headless = true;
    }

    info!(
        base_url = %scenario_config.base_url,
        search = %scenario_config.search_term,
        headless = browser.headless,
        locators = %registry.origin(),
        "Running storefront check"
    );

    let scenario = ShoppingScenario::new(scenario_config, registry).with_wait(config.wait);
    let launcher = ChromeLauncher::new(browser);

    match scenario.run(&launcher).await {
        Ok(report) => print_report(ctx.output(), &report),
        Err(aborted) => {
            print_report(ctx.output(), &aborted.report)?;
            Err(Error::new(aborted))
        }
    }
}

fn print_report(format: OutputFormat, report: &RunReport) -> Result<()> {
    format.emit(report, |report| {
        let status = if report.is_success() { "PASSED" } else { "FAILED" };
        println!("Storefront check {} (run {})", status, report.run_id);
        println!("Final state: {}", report.final_state);
        if let Some(ms) = report.duration_ms() {
            let elapsed = Duration::from_millis(ms.max(0) as u64);
            println!("Duration: {}", format_duration(elapsed));
        }
        println!();

        println!("Steps:");
        for step in &report.steps {
            println!(
                "  {:<24} -> {:<24} {}",
                step.step,
                step.reached.to_string(),
                format_duration(Duration::from_millis(step.duration_ms))
            );
        }

        if !report.interactions.is_empty() {
            println!();
            println!("Interactions:");
            for record in &report.interactions {
                let detail = match &record.event {
                    InteractionEvent::FallbackUsed {
                        primary,
                        fallback,
                        primary_error,
                    } => format!("{primary} failed ({primary_error}); used {fallback}"),
                    InteractionEvent::Absent { timeout_ms } => {
                        format!("not present after {timeout_ms}ms; skipped")
                    }
                    InteractionEvent::Handled { action } => format!("handled with {action}"),
                };
                println!("  {}: {}", record.key, detail);
            }
        }

        if let Some(error) = &report.error {
            println!();
            println!("Error: {}", error);
        }
        if !report.closed {
            println!("Warning: browser was not closed cleanly");
        }
    })
}
