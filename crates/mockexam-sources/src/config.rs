//! Configuration loading and source factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mockexam_core::traits::QuestionSource;

use crate::directory::DirectorySource;
use crate::http::HttpSource;

/// Where chapter banks come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Directory {
        #[serde(default = "default_bank_dir")]
        path: PathBuf,
    },
    Http {
        base_url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            path: default_bank_dir(),
        }
    }
}

fn default_bank_dir() -> PathBuf {
    PathBuf::from("./banks")
}

/// Top-level mockexam configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExamConfig {
    /// Question bank backend.
    #[serde(default)]
    pub source: SourceConfig,
    /// Hide questions at once instead of animating them out.
    #[serde(default)]
    pub reduced_motion: bool,
    /// Per-question exit animation time in the terminal, in milliseconds.
    #[serde(default = "default_exit_item_ms")]
    pub exit_item_ms: u64,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Fixed sampling seed, for repeatable exams.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_exit_item_ms() -> u64 {
    40
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./mockexam-results")
}

impl Default for MockExamConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            reduced_motion: false,
            exit_item_ms: default_exit_item_ms(),
            output_dir: default_output_dir(),
            seed: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::Directory { path } => SourceConfig::Directory {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http { base_url } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
        },
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply `MOCKEXAM_*` overrides, reading variables through `lookup`.
fn apply_env_overrides(config: &mut MockExamConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("MOCKEXAM_BANK_URL") {
        config.source = SourceConfig::Http { base_url: url };
    }
    // A bank directory wins over a URL when both are set.
    if let Some(dir) = lookup("MOCKEXAM_BANK_DIR") {
        config.source = SourceConfig::Directory {
            path: PathBuf::from(dir),
        };
    }
    if let Some(value) = lookup("MOCKEXAM_REDUCED_MOTION") {
        match parse_flag(&value) {
            Some(flag) => config.reduced_motion = flag,
            None => tracing::warn!("ignoring MOCKEXAM_REDUCED_MOTION={value}: not a boolean"),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mockexam.toml` in the current directory
/// 2. `~/.config/mockexam/config.toml`
///
/// Environment variable overrides: `MOCKEXAM_BANK_DIR`, `MOCKEXAM_BANK_URL`,
/// `MOCKEXAM_REDUCED_MOTION`.
pub fn load_config() -> Result<MockExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MockExamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mockexam.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MockExamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MockExamConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config.source = resolve_source_config(&config.source);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mockexam"))
}

/// Create a question source from its configuration.
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn QuestionSource>> {
    match config {
        SourceConfig::Directory { path } => {
            if !path.is_dir() {
                tracing::warn!("bank directory {} does not exist", path.display());
            }
            Ok(Box::new(DirectorySource::new(path.clone())))
        }
        SourceConfig::Http { base_url } => {
            anyhow::ensure!(
                base_url.starts_with("http://") || base_url.starts_with("https://"),
                "bank URL must start with http:// or https://, got {base_url}"
            );
            Ok(Box::new(HttpSource::new(base_url)?))
        }
    }
}
