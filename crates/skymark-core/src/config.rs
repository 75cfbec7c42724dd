//! skymark configuration.
//!
//! A single YAML file (`skymark.yaml` by convention) holding the feed
//! identity, the Bluesky credentials, and the posting knobs. The Bluesky
//! app password may be left out of the file and supplied through the
//! `SKYMARK_BLUESKY_PASSWORD` environment variable instead.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// Environment variable overriding `bluesky.password`.
pub const PASSWORD_ENV: &str = "SKYMARK_BLUESKY_PASSWORD";

// ---------------------------------------------------------------------------
// BlueskyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    /// Handle or DID to post as.
    pub identifier: String,
    /// App password. Prefer `SKYMARK_BLUESKY_PASSWORD` over putting this
    /// in the file.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_service() -> String {
    "https://bsky.social".to_string()
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hatena account whose public bookmark feed is mirrored.
    pub hatena_id: String,
    pub bluesky: BlueskyConfig,
    /// Post body template (`%title%`, `%link%`, `%description%`, `%%`).
    #[serde(default = "default_template")]
    pub template: String,
    /// Attach an Open Graph preview card when the entry has a link.
    #[serde(default)]
    pub enable_preview: bool,
    /// Tracking-store database file.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Pause between passes in `skymark watch`.
    #[serde(default = "default_watch_interval")]
    pub watch_interval_minutes: u64,
}

fn default_template() -> String {
    "%title%\n%link%".to_string()
}

fn default_store_path() -> String {
    "skymark.redb".to_string()
}

fn default_watch_interval() -> u64 {
    30
}

impl Config {
    /// Load the config from `path`, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&raw)?;
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.bluesky.password = password;
        }
        Ok(config)
    }

    /// Reject configs that cannot possibly complete a run.
    pub fn validate(&self) -> Result<()> {
        if self.hatena_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig("hatena_id is empty".into()));
        }
        if self.bluesky.identifier.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "bluesky.identifier is empty".into(),
            ));
        }
        if self.bluesky.password.is_empty() {
            return Err(CoreError::InvalidConfig(format!(
                "bluesky.password is empty (set it in the config or via {PASSWORD_ENV})"
            )));
        }
        if self.template.trim().is_empty() {
            return Err(CoreError::InvalidConfig("template is empty".into()));
        }
        if self.watch_interval_minutes == 0 {
            return Err(CoreError::InvalidConfig(
                "watch_interval_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
        let path = dir.path().join("skymark.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "hatena_id: alice\nbluesky:\n  identifier: alice.bsky.social\n  password: secret\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.hatena_id, "alice");
        assert_eq!(config.bluesky.service, "https://bsky.social");
        assert_eq!(config.template, "%title%\n%link%");
        assert!(!config.enable_preview);
        assert_eq!(config.watch_interval_minutes, 30);
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound(_)));
    }

    #[test]
    fn validate_rejects_missing_password() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "hatena_id: alice\nbluesky:\n  identifier: alice.bsky.social\n",
        );
        // Only meaningful when the env override is unset, as in CI.
        if std::env::var(PASSWORD_ENV).is_err() {
            let config = Config::load(&path).unwrap();
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn validate_rejects_blank_hatena_id() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "hatena_id: \"  \"\nbluesky:\n  identifier: a\n  password: b\n",
        );
        let config = Config::load(&path).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
