//! Policy-supplied settings for the kill-on-startup window.
//!
//! Stores configuration in JSON format at `~/.killonstart/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Banner shown when the policy does not supply its own message.
pub const DEFAULT_MESSAGE: &str =
    "The following applications were started before policy finished loading. \
     You may close them before their grace period ends.";

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Custom banner text shown above the event list.
    #[serde(default, rename = "customMessage", skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,

    /// "More info" link shown with the banner.
    #[serde(default, rename = "customUrl", skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,

    /// Grace period applied to events that do not specify one.
    #[serde(default = "default_grace_period", rename = "defaultGracePeriodSeconds")]
    pub default_grace_period_secs: u64,

    /// How long a completed attempt stays flagged as just completed.
    #[serde(default = "default_confirmation_display", rename = "confirmationDisplayMs")]
    pub confirmation_display_ms: u64,
}

fn default_grace_period() -> u64 {
    30
}

fn default_confirmation_display() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_message: None,
            custom_url: None,
            default_grace_period_secs: default_grace_period(),
            confirmation_display_ms: default_confirmation_display(),
        }
    }
}

impl Config {
    /// Banner text, falling back to [`DEFAULT_MESSAGE`].
    pub fn message(&self) -> &str {
        self.custom_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MESSAGE)
    }

    pub fn confirmation_display(&self) -> Duration {
        Duration::from_millis(self.confirmation_display_ms)
    }
}

/// Configuration store for the policy settings.
///
/// Handles reading and writing configuration to `~/.killonstart/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.killonstart/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".killonstart").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Set or clear the custom banner text.
    pub async fn set_custom_message(&self, message: Option<String>) -> Result<()> {
        let mut config = self.load().await?;
        config.custom_message = message;
        self.save(&config).await
    }

    /// Set or clear the "more info" URL.
    pub async fn set_custom_url(&self, url: Option<String>) -> Result<()> {
        let mut config = self.load().await?;
        config.custom_url = url;
        self.save(&config).await
    }

    /// Set the default grace period in seconds.
    pub async fn set_default_grace_period(&self, secs: u64) -> Result<()> {
        let mut config = self.load().await?;
        config.default_grace_period_secs = secs;
        self.save(&config).await
    }

    /// Set how long completed attempts stay flagged, in milliseconds.
    pub async fn set_confirmation_display_ms(&self, millis: u64) -> Result<()> {
        if millis == 0 {
            return Err(Error::Config(
                "Confirmation display must be at least 1 ms".to_string(),
            ));
        }
        let mut config = self.load().await?;
        config.confirmation_display_ms = millis;
        self.save(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store().await;
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.message(), DEFAULT_MESSAGE);
        assert_eq!(config.confirmation_display(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store().await;

        let config = Config {
            custom_message: Some("Close these now".to_string()),
            custom_url: Some("https://example.com/help".to_string()),
            default_grace_period_secs: 90,
            confirmation_display_ms: 500,
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.message(), "Close these now");
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let (store, _dir) = test_store().await;
        store.save(&Config::default()).await.unwrap();
        std::fs::write(store.config_path(), r#"{"customMessage": "  "}"#).unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.default_grace_period_secs, 30);
        assert_eq!(loaded.confirmation_display_ms, 1000);
        assert_eq!(loaded.message(), DEFAULT_MESSAGE);
    }

    #[tokio::test]
    async fn test_setters() {
        let (store, _dir) = test_store().await;

        store.set_default_grace_period(0).await.unwrap();
        store.set_custom_url(Some("https://example.com".to_string())).await.unwrap();
        store.set_confirmation_display_ms(250).await.unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.default_grace_period_secs, 0);
        assert_eq!(config.custom_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.confirmation_display(), Duration::from_millis(250));

        assert!(store.set_confirmation_display_ms(0).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (store, _dir) = test_store().await;
        store.save(&Config::default()).await.unwrap();
        std::fs::write(store.config_path(), "not json").unwrap();
        assert!(matches!(store.load().await, Err(Error::Config(_))));
    }
}
