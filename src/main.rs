use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    storecheck_cli::cli::app::run().await
}
