use anyhow::Result;
use serde::Serialize;

use crate::cli::context::CliContext;

#[derive(Serialize)]
struct BuildInfo {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    git_branch: &'static str,
    config_path: String,
    base_url: String,
    headless: bool,
    chrome: Option<String>,
}

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE", "unknown"),
        git_hash: env!("GIT_HASH", "unknown"),
        git_branch: env!("GIT_BRANCH", "unknown"),
        config_path: ctx.config_path().display().to_string(),
        base_url: config.scenario.base_url.clone(),
        headless: config.browser.headless,
        chrome: config
            .browser
            .resolve_executable()
            .map(|path| path.display().to_string()),
    };

    ctx.output().emit(&info, |info| {
        println!("storecheck System Information");
        println!("=============================");
        println!("Version: {}", info.version);
        println!("Build Date: {}", info.build_date);
        println!("Git Commit: {} ({})", info.git_hash, info.git_branch);
        println!();
        println!("Configuration:");
        println!("- Config File: {}", info.config_path);
        println!("- Storefront: {}", info.base_url);
        println!("- Headless: {}", info.headless);
        println!(
            "- Chrome: {}",
            info.chrome.as_deref().unwrap_or("(not found; chromiumoxide will search)")
        );
    })
}
