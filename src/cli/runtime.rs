use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of reading `config/local.env`.
///
/// It is read before logging exists, so the outcome is logged afterwards with
/// [`LocalEnv::log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEnv {
    Missing,
    Loaded {
        path: PathBuf,
        applied: Vec<String>,
        invalid_lines: Vec<usize>,
    },
    Unreadable {
        path: PathBuf,
        error: String,
    },
}

impl LocalEnv {
    pub fn log(&self) {
        match self {
            LocalEnv::Missing => {}
            LocalEnv::Loaded {
                path,
                applied,
                invalid_lines,
            } => {
                for line in invalid_lines {
                    warn!(path = %path.display(), line, "invalid local.env entry; skipped");
                }
                info!(
                    path = %path.display(),
                    applied = ?applied,
                    "Loaded environment overrides from local.env"
                );
            }
            LocalEnv::Unreadable { path, error } => {
                warn!(path = %path.display(), %error, "failed to read local.env overrides");
            }
        }
    }
}

/// Export `KEY=value` lines from `config/local.env` without clobbering the
/// real environment
pub fn load_local_env_overrides() -> LocalEnv {
    load_local_env_from(Path::new("config/local.env"))
}

fn load_local_env_from(path: &Path) -> LocalEnv {
    if !path.exists() {
        return LocalEnv::Missing;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            let (entries, invalid_lines) = parse_env_lines(&contents);
            let mut applied = Vec::new();
            for (key, value) in entries {
                if env::var_os(&key).is_none() {
                    env::set_var(&key, value);
                    applied.push(key);
                }
            }
            LocalEnv::Loaded {
                path: path.to_path_buf(),
                applied,
                invalid_lines,
            }
        }
        Err(err) => LocalEnv::Unreadable {
            path: path.to_path_buf(),
            error: err.to_string(),
        },
    }
}

/// Parsed entries plus the 1-based numbers of lines that could not be parsed
fn parse_env_lines(contents: &str) -> (Vec<(String, String)>, Vec<usize>) {
    let mut entries = Vec::new();
    let mut invalid = Vec::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                entries.push((key.trim().to_string(), unquote(value.trim())));
            }
            _ => invalid.push(idx + 1),
        }
    }
    (entries, invalid)
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .map(|inner| inner.replace("\\\"", "\""))
        .unwrap_or_else(|| value.to_string())
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        })
    }
}

// ./config/config.yaml, then <config dir>/storecheck/config.yaml
fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/config.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("storecheck");
    path.push("config.yaml");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_env_lines() {
        let (parsed, invalid) = parse_env_lines(
            "# comment\nSTORECHECK_HEADLESS=true\n\nbroken line\nSTORECHECK_BASE_URL=\"https://shop.test\"\n=orphan\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("STORECHECK_HEADLESS".to_string(), "true".to_string()),
                ("STORECHECK_BASE_URL".to_string(), "https://shop.test".to_string()),
            ]
        );
        assert_eq!(invalid, vec![4, 6]);
    }

    #[test]
    fn test_local_env_outcome_is_returned_for_later_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.env");
        assert_eq!(load_local_env_from(&path), LocalEnv::Missing);

        std::fs::write(
            &path,
            "STORECHECK_LOCAL_ENV_TEST_APPLIED=1\nnot an entry\nPATH=/clobbered\n",
        )
        .unwrap();
        let outcome = load_local_env_from(&path);

        assert_eq!(
            outcome,
            LocalEnv::Loaded {
                path: path.clone(),
                applied: vec!["STORECHECK_LOCAL_ENV_TEST_APPLIED".to_string()],
                invalid_lines: vec![2],
            }
        );
        assert_eq!(
            env::var("STORECHECK_LOCAL_ENV_TEST_APPLIED").as_deref(),
            Ok("1")
        );
        assert_ne!(env::var("PATH").as_deref(), Ok("/clobbered"));
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "scenario:\n  settle_ms: 500\nwait:\n  timeout_ms: 3000").unwrap();

        let loaded = load_config(Some(&file.path().to_path_buf())).await.unwrap();
        assert_eq!(loaded.config.scenario.settle_ms, 500);
        assert_eq!(loaded.config.wait.timeout_ms, 3000);
        assert_eq!(loaded.path, file.path());
    }

    #[tokio::test]
    async fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let loaded = load_config(Some(&missing)).await.unwrap();
        assert_eq!(loaded.config, Config::default());
    }

    #[tokio::test]
    async fn test_invalid_config_fails() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "scenario: [not, a, map]").unwrap();
        let err = load_config(Some(&file.path().to_path_buf()))
            .await
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
