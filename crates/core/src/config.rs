//! Application configuration, layered from defaults, a JSON file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "feedforward";

/// Prefix for environment overrides, e.g. `FEEDFORWARD__DATA_DIR`.
pub const ENV_PREFIX: &str = "FEEDFORWARD";

/// Runtime configuration for the marketplace core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the snapshot files.
    pub data_dir: PathBuf,
    /// Snapshot file for registered users.
    pub users_file: String,
    /// Snapshot file for the listing catalog.
    pub listings_file: String,
    /// Snapshot file for placed tickets.
    pub tickets_file: String,
    /// Directory for `feedforward.log`.
    pub log_dir: PathBuf,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// How many ticket ids to draw before accepting a collision.
    pub ticket_id_attempts: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            users_file: "savedUsers.json".to_string(),
            listings_file: "savedListings.json".to_string(),
            tickets_file: "savedTickets.json".to_string(),
            log_filter: "info".to_string(),
            ticket_id_attempts: 8,
        }
    }
}

impl AppConfig {
    /// Load from the default config file (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from an explicit config file (if present) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Defaults with data and logs rooted at `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            ..Self::default()
        }
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config {}", path.display()))
    }

    fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.users_file = sanitize_file_name(&self.users_file, &defaults.users_file);
        self.listings_file = sanitize_file_name(&self.listings_file, &defaults.listings_file);
        self.tickets_file = sanitize_file_name(&self.tickets_file, &defaults.tickets_file);
        self.ticket_id_attempts = self.ticket_id_attempts.max(1);
        self
    }
}

/// Default config file location, `<config dir>/feedforward/config.json`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

/// Write the default configuration unless a config file already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_default_config_at(config_path())
}

/// Like [`ensure_default_config`] for an explicit path.
pub fn ensure_default_config_at(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if !path.exists() {
        AppConfig::default().persist(&path)?;
    }
    Ok(path)
}

/// Reduce a configured file name to a single safe path component.
pub(crate) fn sanitize_file_name(input: &str, fallback: &str) -> String {
    let result: String = input
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        .collect();
    let result = result.trim_start_matches('.');
    if result.is_empty() {
        fallback.to_string()
    } else {
        result.to_string()
    }
}
