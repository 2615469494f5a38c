//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config dir>/secop-lookup/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! Every section and key of the TOML file is optional. A missing file at the
//! platform location is not an error; an explicitly named file that cannot be
//! read or parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SECOP_LOOKUP_CONFIG";

/// Application directory name under the platform config directory
pub const APP_DIR_NAME: &str = "secop-lookup";

/// SECOP II electronic contracts dataset
pub const DEFAULT_CONTRACTS_URL: &str = "https://www.datos.gov.co/resource/jbjy-vk9h.json";

/// SECOP II procurement processes dataset
pub const DEFAULT_PROCESSES_URL: &str = "https://www.datos.gov.co/resource/p6dx-8zbt.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5731;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Remote dataset endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub contracts_url: String,
    pub processes_url: String,
    /// Per-request timeout for dataset queries
    pub timeout_secs: u64,
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            contracts_url: DEFAULT_CONTRACTS_URL.to_string(),
            processes_url: DEFAULT_PROCESSES_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Logging settings (RUST_LOG takes precedence at runtime)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("sources.contracts_url", &self.sources.contracts_url),
            ("sources.processes_url", &self.sources.processes_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    key, url
                )));
            }
        }
        if self.sources.timeout_secs == 0 {
            return Err(Error::Config(
                "sources.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformDefault(PathBuf),
    CompiledDefaults,
}

/// Resolves and loads the configuration file following the priority order
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    platform_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver using the platform config directory
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            platform_path: platform_config_path(),
        }
    }

    /// Override the platform location (used by tests)
    pub fn with_platform_path(mut self, path: Option<PathBuf>) -> Self {
        self.platform_path = path;
        self
    }

    /// Decide which file, if any, supplies the configuration
    pub fn source(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        match &self.platform_path {
            Some(path) if path.exists() => ConfigSource::PlatformDefault(path.clone()),
            _ => ConfigSource::CompiledDefaults,
        }
    }

    /// Load the effective configuration
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.source();
        let config = match &source {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                info!("Loading config from {}", path.display());
                TomlConfig::load_file(path)?
            }
            ConfigSource::PlatformDefault(path) => match TomlConfig::load_file(path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring unusable config {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            ConfigSource::CompiledDefaults => {
                info!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };
        Ok((config, source))
    }
}

/// Platform config file location, if the platform has a config directory
pub fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}
