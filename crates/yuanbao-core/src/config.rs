//! Application configuration management.
//!
//! Optional defaults for the chat command: conversation ID, model,
//! internet search, request timeout, and where to save user info.
//! Command-line flags take precedence over anything set here.
//!
//! Configuration is stored at `~/.config/yuanbao-chat/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::ChatModel;

/// Application name used for config directory paths
const APP_NAME: &str = "yuanbao-chat";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default env file holding `YUANBAO_COOKIE` entries
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default file for the validated user's info
pub const DEFAULT_USER_INFO_FILE: &str = "user.json";

/// HTTP request timeout in seconds.
/// Reasoning models can think for a long time before the first answer token.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub conversation_id: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub internet: bool,
    pub timeout_secs: Option<u64>,
    pub env_file: Option<PathBuf>,
    pub user_info_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Configured model, falling back to the default for unknown names.
    pub fn chat_model(&self) -> ChatModel {
        self.model
            .as_deref()
            .map(ChatModel::from_name_or_default)
            .unwrap_or_default()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE))
    }

    pub fn user_info_path(&self) -> PathBuf {
        self.user_info_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_USER_INFO_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chat_model(), ChatModel::DeepSeekV3);
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.env_file(), PathBuf::from(".env"));
        assert_eq!(config.user_info_path(), PathBuf::from("user.json"));
        assert!(!config.internet);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.conversation_id.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model":"deepseek-r1","internet":true}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.chat_model(), ChatModel::DeepSeekR1);
        assert!(config.internet);
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
