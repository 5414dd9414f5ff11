use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskdeck::{RollbackPolicy, SyncOptions};

use crate::i18n::Language;
use crate::ui::Theme;

/// Overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "TASKDECK_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskdeckConfig {
    /// Base URL of the task API, e.g. "http://localhost:3000"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(skip)]
    api_url_override: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// `keep` leaves a failed change in place, `revert` undoes it.
    #[serde(default)]
    pub rollback: RollbackPolicy,
    /// Create added tasks on the server too.
    #[serde(default = "default_push_new_tasks")]
    pub push_new_tasks: bool,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_push_new_tasks() -> bool {
    true
}

impl Default for TaskdeckConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            language: Language::default(),
            theme: Theme::default(),
            sync: SyncSettings::default(),
            api_url_override: None,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            rollback: RollbackPolicy::default(),
            push_new_tasks: default_push_new_tasks(),
        }
    }
}

impl From<SyncSettings> for SyncOptions {
    fn from(settings: SyncSettings) -> Self {
        SyncOptions {
            rollback: settings.rollback,
            push_new_tasks: settings.push_new_tasks,
        }
    }
}

impl TaskdeckConfig {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("taskdeck"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from disk, then apply the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.override_api_url(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config, creating parent directories as needed. An environment
    /// override is never written back.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    pub fn override_api_url(&mut self, url: Option<String>) {
        self.api_url_override = url.filter(|u| !u.trim().is_empty());
    }

    pub fn api_url(&self) -> &str {
        self.api_url_override.as_deref().unwrap_or(&self.api_url)
    }

    pub fn sync_options(&self) -> SyncOptions {
        self.sync.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TaskdeckConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, TaskdeckConfig::default());
        assert_eq!(config.api_url(), "http://localhost:3000");
        assert!(config.sync.push_new_tasks);
        assert_eq!(config.sync.rollback, RollbackPolicy::Keep);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "theme = \"dark\"\n[sync]\nrollback = \"revert\"\n",
        )
        .unwrap();

        let config = TaskdeckConfig::load_from(&path).unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.language, Language::En);
        assert_eq!(config.sync.rollback, RollbackPolicy::Revert);
        assert!(config.sync.push_new_tasks);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = TaskdeckConfig {
            language: Language::Es,
            theme: Theme::Dark,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(TaskdeckConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn env_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = TaskdeckConfig::default();
        config.override_api_url(Some("http://tasks.internal:8080".to_string()));
        assert_eq!(config.api_url(), "http://tasks.internal:8080");

        config.save_to(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("tasks.internal"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = TaskdeckConfig::default();
        config.override_api_url(Some("  ".to_string()));
        assert_eq!(config.api_url(), "http://localhost:3000");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = [").unwrap();
        assert!(TaskdeckConfig::load_from(&path).is_err());
    }
}
