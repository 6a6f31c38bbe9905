//! Configuration loading and database path resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing file is
//! not an error: defaults are used and a warning is logged.
//!
//! Database path priority:
//! 1. Command-line argument
//! 2. `OWA_DATABASE` environment variable
//! 3. `database_path` in the TOML file
//! 4. OS-dependent default (`<data_local_dir>/owa/owa.db`)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "OWA_DATABASE";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "OWA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// External base URL used when building resource links
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: default_host(),
            port: default_port(),
            base_url: None,
            logging: LoggingConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Base URL for links; falls back to `http://host:port`
    pub fn external_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
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

/// Ingestion configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Audio file extensions accepted by the scanner (case-insensitive)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default audio extension allowlist
pub fn default_extensions() -> Vec<String> {
    ["mp3", "flac", "ogg", "oga", "m4a"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Load the TOML config
///
/// `path` wins over `OWA_CONFIG`, which wins over the platform config
/// directory. Missing files yield defaults; unreadable or malformed files
/// are errors.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path),
    };

    let Some(path) = path else {
        warn!("No config directory available, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Platform config file location (`<config_dir>/owa/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("owa").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("owa").join("owa.db"))
        .unwrap_or_else(|| PathBuf::from("./owa_data/owa.db"))
}

/// Resolve the database path following the documented priority order
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_toml_config(
            r#"
            database_path = "/srv/owa/owa.db"
            host = "0.0.0.0"
            port = 8080
            base_url = "https://music.example.org/"

            [logging]
            level = "debug"

            [ingest]
            extensions = ["mp3", "wav"]
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("/srv/owa/owa.db")));
        assert_eq!(config.port, 8080);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.ingest.extensions, vec!["mp3", "wav"]);
        assert_eq!(config.external_base_url(), "https://music.example.org");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_toml_config("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.external_base_url(), "http://127.0.0.1:5780");
        assert_eq!(config.ingest.extensions, default_extensions());
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(matches!(
            parse_toml_config("port = \"not a number\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_cli_arg_has_priority() {
        let config = TomlConfig {
            database_path: Some(PathBuf::from("/from/toml.db")),
            ..TomlConfig::default()
        };
        let path = resolve_database_path(Some(Path::new("/from/cli.db")), &config);
        assert_eq!(path, PathBuf::from("/from/cli.db"));
    }
}
