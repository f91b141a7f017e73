//! User configuration for the snapshot subsystem.
//!
//! Stored as JSON in the per-user config directory. A missing file means
//! defaults; nothing is written until [`SnapshotConfig::save`] is called.

use crate::core::dirs::get_config_directory;
use crate::core::error::Result;
use crate::core::executor::DEFAULT_COMMAND_TIMEOUT;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.json";

/// Overrides `command_timeout_secs` when set to a positive integer
pub const TIMEOUT_ENV_VAR: &str = "DECK_SNAPSHOT_GIT_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotConfig {
    pub command_timeout_secs: u64,
    pub history_limit: usize,
    pub backup_before_restore: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            history_limit: 10,
            backup_before_restore: true,
        }
    }
}

impl SnapshotConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join(CONFIG_FILE))
    }

    /// Load from the user config directory, then apply environment overrides
    pub fn load_or_default() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_override(std::env::var(TIMEOUT_ENV_VAR).ok().as_deref());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        if self.command_timeout_secs == 0 {
            DEFAULT_COMMAND_TIMEOUT
        } else {
            Duration::from_secs(self.command_timeout_secs)
        }
    }

    fn apply_env_override(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => self.command_timeout_secs = secs,
            _ => warn!("Ignoring invalid {TIMEOUT_ENV_VAR}={value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.history_limit, 10);
        assert!(config.backup_before_restore);
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = SnapshotConfig::load_from(&temp_dir.path().join(CONFIG_FILE))?;
        assert_eq!(config, SnapshotConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_and_reload_partial_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join(CONFIG_FILE);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, r#"{ "history_limit": 25 }"#)?;

        let config = SnapshotConfig::load_from(&path)?;
        assert_eq!(config.history_limit, 25);
        assert_eq!(config.command_timeout_secs, 30);

        let changed = SnapshotConfig {
            backup_before_restore: false,
            ..config
        };
        changed.save_to(&path)?;
        assert_eq!(SnapshotConfig::load_from(&path)?, changed);
        Ok(())
    }

    #[test]
    fn test_env_override() {
        let mut config = SnapshotConfig::default();
        config.apply_env_override(Some("5"));
        assert_eq!(config.command_timeout(), Duration::from_secs(5));

        config.apply_env_override(Some("not a number"));
        config.apply_env_override(Some("0"));
        assert_eq!(config.command_timeout_secs, 5);
    }
}
