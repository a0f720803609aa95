use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::constants::models;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub gemini: GeminiConfig,

    pub storage: StorageConfig,

    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Directory holding the JSON table files.
    pub data_dir: String,

    /// Tokio worker threads; 0 means the runtime default.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: default_data_dir(),
            worker_threads: 0,
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bottega")
        .to_string_lossy()
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Session inactivity expiry, in minutes.
    pub session_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7870,
            cors_allowed_origins: vec!["*".to_string()],
            session_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Overridden by `GEMINI_API_KEY` when set in the environment.
    pub api_key: String,

    pub base_url: String,

    pub story_model: String,

    pub image_model: String,

    pub video_model: String,

    pub request_timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            story_model: models::STORY.to_string(),
            image_model: models::IMAGE_EDIT.to_string(),
            video_model: models::VIDEO.to_string(),
            request_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Total byte budget across all tables, standing in for the browser
    /// storage quota. `None` disables the check.
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: Some(64 * 1024 * 1024),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Seconds between status checks on a running video job.
    pub poll_interval_seconds: u64,

    /// Seconds between rotations of the user-facing progress message.
    pub progress_interval_seconds: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            progress_interval_seconds: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            storage: StorageConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn config_path() -> PathBuf {
        std::env::var("BOTTEGA_CONFIG")
            .map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !key.is_empty()
        {
            config.gemini.api_key = key;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero");
        }
        if self.video.poll_interval_seconds == 0 {
            anyhow::bail!("Video poll interval must be > 0");
        }
        if self.video.progress_interval_seconds == 0 {
            anyhow::bail!("Video progress interval must be > 0");
        }
        if self.gemini.api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is not set (config [gemini].api_key or GEMINI_API_KEY)"
            );
        }
        Ok(())
    }
}
