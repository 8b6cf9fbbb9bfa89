//! Configuration management for `relation_manager`.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - YAML file (`--config <path>`, or `./relman.yaml` when present)
//! - Environment variable overrides (`RELMAN_PROJECT`, `RELMAN_HISTORY_ENABLED`)
//! - CLI flags

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RelationError, Result};
use crate::sync::HistoryConfig;

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "relman.yaml";

pub const ENV_PROJECT: &str = "RELMAN_PROJECT";
pub const ENV_HISTORY_ENABLED: &str = "RELMAN_HISTORY_ENABLED";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pretty-print exported documents.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Project snapshot to operate on.
    pub project: Option<PathBuf>,
    pub export: ExportConfig,
    pub history: HistoryConfig,
}

/// Values taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl Config {
    /// Parse a YAML config document.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the YAML is malformed or has unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| RelationError::Config(format!("Invalid config: {e}")))
    }

    /// Read a YAML config file. A relative `project` path is taken relative
    /// to the directory holding the file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file is missing, `Config` if it does
    /// not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelationError::FileNotFound(path.to_path_buf())
            } else {
                RelationError::Io(e)
            }
        })?;

        let mut config = Self::from_yaml(&text)?;
        if let (Some(project), Some(base)) = (config.project.as_ref(), path.parent()) {
            if project.is_relative() {
                config.project = Some(base.join(project));
            }
        }
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `RELMAN_HISTORY_ENABLED` is not a boolean.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project) = lookup(ENV_PROJECT).filter(|v| !v.trim().is_empty()) {
            self.project = Some(PathBuf::from(project));
        }
        if let Some(raw) = lookup(ENV_HISTORY_ENABLED) {
            self.history.enabled = parse_bool(&raw).ok_or_else(|| {
                RelationError::Config(format!("{ENV_HISTORY_ENABLED}: expected a boolean, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    /// Apply CLI overrides.
    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(project) = &cli.project {
            self.project = Some(project.clone());
        }
    }

    /// The project snapshot path.
    ///
    /// # Errors
    ///
    /// Returns `Config` when no project was configured anywhere.
    pub fn project_path(&self) -> Result<&Path> {
        self.project.as_deref().ok_or_else(|| {
            RelationError::Config(format!(
                "No project set; pass --project, set {ENV_PROJECT} or add 'project' to {DEFAULT_CONFIG_FILE}"
            ))
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load configuration from every source.
///
/// # Errors
///
/// Returns an error if an explicit config file is missing or any source is
/// malformed.
pub fn load(cli: &CliOverrides) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Config::from_file(default)?
            } else {
                Config::default()
            }
        }
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.apply_cli(cli);

    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}
