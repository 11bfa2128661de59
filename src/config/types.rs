//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::limits::LimitsConfig;
use super::listen::ListenConfig;
use super::oper::OperBlock;
use super::validation;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read MOTD file {path}: {source}")]
    Motd {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Nick, channel and queue limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Channel defaults.
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Operator blocks.
    #[serde(default)]
    pub oper: Vec<OperBlock>,
    /// Expanded MOTD text, filled from `server.motd_path` at load time.
    #[serde(skip)]
    pub motd: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A relative `motd_path` is resolved against the config file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        if let Some(motd_path) = &config.server.motd_path {
            let resolved = match path.parent() {
                Some(dir) if motd_path.is_relative() => dir.join(motd_path),
                _ => motd_path.clone(),
            };
            let raw = std::fs::read_to_string(&resolved).map_err(|source| ConfigError::Motd {
                path: resolved.clone(),
                source,
            })?;
            config.motd = Some(crate::motd::expand(&raw));
        }

        Ok(config)
    }

    /// Parse and validate configuration text. The MOTD file is not read.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(|errors| {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            ConfigError::Invalid(joined)
        })?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used as the prefix of every server reply (e.g., "irc.example.net").
    pub name: String,
    /// Network name (e.g., "ExampleNet").
    pub network: String,
    /// Server description shown in WHOIS.
    #[serde(default = "default_description")]
    pub description: String,
    /// Version string for 002/004; defaults to the crate version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Path of the MOTD file, markup-expanded at load time.
    pub motd_path: Option<PathBuf>,
}

fn default_description() -> String {
    "tinyircd server".to_string()
}

fn default_version() -> String {
    concat!("tinyircd-", env!("CARGO_PKG_VERSION")).to_string()
}

/// Channel defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Modes applied to a newly created channel (letters from `imnpst`).
    #[serde(default = "default_modes")]
    pub default_modes: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            default_modes: default_modes(),
        }
    }
}

fn default_modes() -> String {
    "+nt".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (default: "info").
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format (default: pretty).
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
