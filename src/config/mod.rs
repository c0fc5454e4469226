use crate::media::{AttemptKind, AttemptProfile, NormalizeSettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub binary: String,
    pub socket_timeout_secs: u64,
    /// Hard limit for one engine invocation, including its own retries.
    pub attempt_timeout_secs: u64,
    pub retries: u32,
    pub user_agent: String,
    pub primary_client: Option<String>,
    pub alternate_client: String,
    pub skip_manifests: bool,
    pub playlist_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            socket_timeout_secs: 30,
            attempt_timeout_secs: 120,
            retries: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            primary_client: None,
            alternate_client: "android".to_string(),
            skip_manifests: true,
            playlist_limit: 25,
        }
    }
}

impl EngineConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs.max(1))
    }

    /// Engine settings for one step of the fallback chain.
    pub fn profile(&self, kind: AttemptKind) -> AttemptProfile {
        let player_client = match kind {
            AttemptKind::Primary => self.primary_client.clone(),
            AttemptKind::Alternate => Some(self.alternate_client.clone()),
            AttemptKind::BasicInfo => None,
        };

        AttemptProfile {
            kind,
            user_agent: self.user_agent.clone(),
            retries: self.retries,
            socket_timeout: Duration::from_secs(self.socket_timeout_secs.max(1)),
            player_client,
            skip_manifests: self.skip_manifests,
            metadata_only: kind == AttemptKind::BasicInfo,
            playlist_limit: self.playlist_limit.max(1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub description_limit: usize,
    pub format_summary_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = NormalizeSettings::default();
        Self {
            description_limit: defaults.description_limit,
            format_summary_limit: defaults.format_summary_limit,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid TOML")?;
        Ok(config)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    pub fn normalize_settings(&self) -> NormalizeSettings {
        NormalizeSettings {
            description_limit: self.output.description_limit,
            format_summary_limit: self.output.format_summary_limit,
        }
    }
}

/// Where to look for a config file: explicit path, `CONFIG_FILE`, then the XDG and home config dirs.
pub fn get_config_path(explicit: Option<&str>) -> Option<String> {
    if let Some(path) = explicit {
        return Some(path.to_string());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/mediagrab/config.toml", xdg_config_home);
        if Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/mediagrab/config.toml", home.display());
        if Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}
