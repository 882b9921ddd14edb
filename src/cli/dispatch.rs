use super::env::CliArgs;
use super::info::cmd_info;
use super::locators::cmd_locators;
use super::run::cmd_run;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Locators(args) => cmd_locators(args, ctx).await,
        Commands::Info => cmd_info(ctx).await,
    }
}
