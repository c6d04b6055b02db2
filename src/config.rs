use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

const APP_DIR: &str = "sitewatch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Maximum number of change records kept in the history document.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Pause inserted after every source during a crawl pass.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    #[serde(default = "default_max_segments")]
    pub max_segments: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .to_string_lossy()
        .to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_request_timeout() -> u64 {
    30
}

fn default_request_delay() -> u64 {
    1000
}

fn default_max_segment_chars() -> usize {
    500
}

fn default_max_segments() -> usize {
    5
}

fn default_user_agent() -> String {
    format!("sitewatch/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_limit: default_history_limit(),
            request_timeout_secs: default_request_timeout(),
            request_delay_ms: default_request_delay(),
            max_segment_chars: default_max_segment_chars(),
            max_segments: default_max_segments(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default location), writing defaults if the file is missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(AppError::Config("history_limit must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn registry_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("feeds.json")
    }

    pub fn history_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("updates.json")
    }

    pub fn pending_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("pending.json")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("snapshots")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str("data_dir = \"/tmp/watch\"\nhistory_limit = 20\n").unwrap();
        assert_eq!(config.data_dir, "/tmp/watch");
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.max_segment_chars, 500);
        assert_eq!(config.max_segments, 5);
        assert_eq!(config.request_delay(), Duration::from_millis(1000));
        assert_eq!(config.registry_path(), PathBuf::from("/tmp/watch/feeds.json"));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(path.as_path())).unwrap();
        assert!(path.exists());
        assert_eq!(config.history_limit, 100);

        let reloaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(reloaded.data_dir, config.data_dir);
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "history_limit = 0\n").unwrap();

        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
