use std::path::{Path, PathBuf};
use std::sync::Arc;

use action_locator::LocatorRegistry;
use anyhow::{Context, Result};
use tokio::sync::OnceCell;

use crate::cli::output::OutputFormat;
use crate::config::Config;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    output: OutputFormat,
    registry: OnceCell<Arc<LocatorRegistry>>,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
            registry: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Locator registry, loaded once per process.
    ///
    /// `explicit` is tried before the configured and bundled sources.
    pub async fn registry(&self, explicit: Option<PathBuf>) -> Result<Arc<LocatorRegistry>> {
        self.registry
            .get_or_try_init(|| async move {
                let candidates = self.config.locator_candidates(explicit);
                LocatorRegistry::load(&candidates)
                    .map(Arc::new)
                    .context("Failed to load locator definitions")
            })
            .await
            .map(Arc::clone)
    }
}
