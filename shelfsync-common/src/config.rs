//! Configuration loading and resolution
//!
//! Settings are resolved per option in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SHELFSYNC_*`, merged with 1 by the binary's arg parser)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: it logs a warning and contributes
//! nothing. A TOML file that exists but cannot be parsed is a [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_PATH_ENV: &str = "SHELFSYNC_CONFIG";

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "upload";
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_AUTO_CHUNK_THRESHOLD_BYTES: u64 = 64 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Set-difference execution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStrategy {
    /// Pick `Bulk` or `Chunked` from the catalog artifact size
    #[default]
    Auto,
    /// One catalog row at a time (correctness baseline)
    RowWise,
    /// Whole normalized columns at once
    Bulk,
    /// Bounded-size catalog batches
    Chunked,
}

impl ComparisonStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonStrategy::Auto => "auto",
            ComparisonStrategy::RowWise => "row_wise",
            ComparisonStrategy::Bulk => "bulk",
            ComparisonStrategy::Chunked => "chunked",
        }
    }
}

impl fmt::Display for ComparisonStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(ComparisonStrategy::Auto),
            "row_wise" | "rowwise" => Ok(ComparisonStrategy::RowWise),
            "bulk" | "vectorized" => Ok(ComparisonStrategy::Bulk),
            "chunked" | "streaming" => Ok(ComparisonStrategy::Chunked),
            other => Err(Error::Config(format!(
                "Unknown comparison strategy '{}' (expected auto, row_wise, bulk or chunked)",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration as read from a TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub inventory_source_url: Option<String>,
    pub catalog_source_url: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub strategy: Option<ComparisonStrategy>,
    pub auto_chunk_threshold_bytes: Option<u64>,
    pub cache_inventory_keys: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub inventory_source_url: Option<String>,
    pub catalog_source_url: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub strategy: Option<ComparisonStrategy>,
    pub cache_inventory_keys: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub inventory_source_url: String,
    pub catalog_source_url: String,
    pub output_directory: PathBuf,
    pub chunk_size: usize,
    pub strategy: ComparisonStrategy,
    pub auto_chunk_threshold_bytes: u64,
    pub cache_inventory_keys: bool,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides over a TOML config over compiled defaults
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let inventory_source_url = overrides
            .inventory_source_url
            .clone()
            .or_else(|| toml.inventory_source_url.clone())
            .ok_or_else(|| Error::Config("inventory_source_url is not configured".to_string()))?;

        let catalog_source_url = overrides
            .catalog_source_url
            .clone()
            .or_else(|| toml.catalog_source_url.clone())
            .ok_or_else(|| Error::Config("catalog_source_url is not configured".to_string()))?;

        let chunk_size = overrides
            .chunk_size
            .or(toml.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }

        let config = Self {
            inventory_source_url,
            catalog_source_url,
            output_directory: overrides
                .output_directory
                .clone()
                .or_else(|| toml.output_directory.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
            chunk_size,
            strategy: overrides.strategy.or(toml.strategy).unwrap_or_default(),
            auto_chunk_threshold_bytes: toml
                .auto_chunk_threshold_bytes
                .unwrap_or(DEFAULT_AUTO_CHUNK_THRESHOLD_BYTES),
            cache_inventory_keys: overrides
                .cache_inventory_keys
                .or(toml.cache_inventory_keys)
                .unwrap_or(false),
            request_timeout_secs: toml
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            accept_invalid_certs: toml.accept_invalid_certs.unwrap_or(false),
            host: overrides
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            log_level: overrides
                .log_level
                .clone()
                .unwrap_or_else(|| toml.logging.level.clone()),
        };

        Ok(config)
    }
}

/// Locate the TOML config file
///
/// Priority: explicit path → `SHELFSYNC_CONFIG` → `<config_dir>/shelfsync/<module>.toml`.
/// Returns `None` only when no platform config directory exists.
pub fn resolve_config_path(cli_arg: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("shelfsync").join(format!("{}.toml", module_name)))
}

/// Load a TOML config file, degrading to defaults when it does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using defaults and overrides only",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
