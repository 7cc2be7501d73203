use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::UserInfo;

/// User info as written to disk, stamped with when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedUserInfo {
    #[serde(flatten)]
    pub info: UserInfo,
    pub fetched_at: DateTime<Utc>,
}

impl SavedUserInfo {
    pub fn new(info: UserInfo) -> Self {
        Self {
            info,
            fetched_at: Utc::now(),
        }
    }
}

/// JSON file holding the profile of the last validated user.
pub struct UserInfoStore {
    path: PathBuf,
}

impl UserInfoStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save user info to disk
    pub fn save(&self, info: &UserInfo) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let saved = SavedUserInfo::new(info.clone());
        let contents = serde_json::to_string_pretty(&saved)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Saved user info");
        Ok(())
    }

    /// Load user info from disk, if it was saved before
    pub fn load(&self) -> Result<Option<SavedUserInfo>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read user info file")?;
        let saved = serde_json::from_str(&contents)
            .context("Failed to parse user info file")?;
        Ok(Some(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_info() -> UserInfo {
        serde_json::from_str(r#"{"userId":"u_1","status":2,"nickname":"元宝用户"}"#).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = UserInfoStore::new(dir.path().join("nested").join("user.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&sample_info()).unwrap();

        let saved = store.load().unwrap().expect("user info should be saved");
        assert!(saved.info.is_active());
        assert_eq!(saved.info.nickname(), Some("元宝用户"));
        assert!(!saved.info.extra.contains_key("fetched_at"));
        assert!((Utc::now() - saved.fetched_at).num_minutes() <= 1);
    }

    #[test]
    fn test_saved_file_is_flat_json() {
        let dir = TempDir::new().unwrap();
        let store = UserInfoStore::new(dir.path().join("user.json"));
        store.save(&sample_info()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["userId"], "u_1");
        assert_eq!(raw["status"], 2);
        assert!(raw["fetched_at"].is_string());
    }
}
