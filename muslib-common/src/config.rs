//! Configuration loading and resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line arguments and environment variables are merged by the binary
//! (clap `env` attributes) and handed over as [`ConfigOverrides`].

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "MUSLIB_CONFIG";

/// Enrichment endpoint used when nothing else is configured
pub const DEFAULT_ENRICHMENT_URL: &str = "http://external-api.com/info";

/// Listen address used when nothing else is configured
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Contents of the optional TOML config file
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub enrichment_url: Option<String>,
    pub enrichment_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load a TOML config file
    ///
    /// Returns `None` when nothing exists at `path`. A file that exists but
    /// fails to parse is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Some(config))
    }
}

/// Where the TOML layer of the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No candidate path at all
    None,
    /// A path was resolved but no file exists there
    Missing(PathBuf),
    /// The file was read and parsed
    Loaded(PathBuf),
}

impl ConfigSource {
    /// Report the config file outcome
    ///
    /// Config is read before the subscriber exists (it supplies the log
    /// level), so the binary calls this once tracing is initialized.
    pub fn log(&self) {
        match self {
            ConfigSource::None => info!("No config file location available (using defaults)"),
            ConfigSource::Missing(path) => {
                warn!("Config file not found: {} (using defaults)", path.display())
            }
            ConfigSource::Loaded(path) => info!("Loaded config file: {}", path.display()),
        }
    }
}

/// Read the TOML config file at `path`, if any
pub fn load_config_file(path: Option<PathBuf>) -> Result<(TomlConfig, ConfigSource)> {
    let Some(path) = path else {
        return Ok((TomlConfig::default(), ConfigSource::None));
    };

    match TomlConfig::load(&path)? {
        Some(config) => Ok((config, ConfigSource::Loaded(path))),
        None => Ok((TomlConfig::default(), ConfigSource::Missing(path))),
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub enrichment_url: Option<String>,
    pub enrichment_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind: String,
    pub database_url: String,
    pub enrichment_url: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database_url: default_database_url(),
            enrichment_url: DEFAULT_ENRICHMENT_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub database_url: String,
    pub enrichment_url: String,
    /// Per-request timeout for the enrichment call. `None` leaves the
    /// transport default in place.
    pub enrichment_timeout: Option<Duration>,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, TOML values and compiled defaults, then validate
    pub fn resolve(
        overrides: ConfigOverrides,
        toml_config: TomlConfig,
        defaults: CompiledDefaults,
    ) -> Result<Self> {
        let bind = overrides
            .bind
            .or(toml_config.bind)
            .unwrap_or(defaults.bind);
        let bind: SocketAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let database_url = overrides
            .database_url
            .or(toml_config.database_url)
            .unwrap_or(defaults.database_url);
        if !database_url.starts_with("sqlite:") {
            return Err(Error::Config(format!(
                "Unsupported database URL '{}' (expected sqlite:...)",
                database_url
            )));
        }

        let enrichment_url = overrides
            .enrichment_url
            .or(toml_config.enrichment_url)
            .unwrap_or(defaults.enrichment_url);
        if !(enrichment_url.starts_with("http://") || enrichment_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Invalid enrichment URL '{}' (expected http:// or https://)",
                enrichment_url
            )));
        }

        let enrichment_timeout = match overrides
            .enrichment_timeout_secs
            .or(toml_config.enrichment_timeout_secs)
        {
            Some(0) => {
                return Err(Error::Config(
                    "Enrichment timeout must be at least 1 second".to_string(),
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let log_level = overrides
            .log_level
            .or(toml_config.log_level)
            .unwrap_or(defaults.log_level);

        Ok(Self {
            bind,
            database_url,
            enrichment_url,
            enrichment_timeout,
            log_level,
        })
    }
}

/// Locate the TOML config file
///
/// Priority: command-line argument, then `MUSLIB_CONFIG`, then the platform
/// config directory (`~/.config/muslib/config.toml` on Linux).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("muslib").join("config.toml"))
}

/// Get the OS-dependent default database URL
fn default_database_url() -> String {
    let data_dir = dirs::data_local_dir()
        .map(|d| d.join("muslib"))
        .unwrap_or_else(|| PathBuf::from("./muslib_data"));

    format!("sqlite://{}?mode=rwc", data_dir.join("muslib.db").display())
}
