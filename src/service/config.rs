//! Service configuration loading.
//!
//! Configuration lives in a TOML file. Its location is `$ANNOSEARCH_CONFIG`
//! when set, otherwise `config.toml` in the platform config directory. A
//! missing file means defaults; a malformed one is an error.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::ipc::DEFAULT_ADDR;
use crate::{AnnoError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ANNOSEARCH_CONFIG";

const CONFIG_FILE: &str = "config.toml";

/// Service configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Data directory for the database and logs
    pub data_dir: PathBuf,
    /// Loopback address the IPC server binds to
    pub listen_addr: String,
    /// JSON-LD collection imported into the store at startup
    pub seed_file: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "eudat", "annosearch")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("annosearch-data"));

        Self {
            data_dir,
            listen_addr: DEFAULT_ADDR.to_string(),
            seed_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default location, or return defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Where [`load`](Self::load) looks for the config file.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnnoError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| {
            AnnoError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })
    }

    /// Parse config from TOML text. Absent keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AnnoError::Config(e.to_string()))
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("annotations.db")
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:7878");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.seed_file, None);
        assert_eq!(config.database_path(), config.data_dir.join("annotations.db"));
        assert_eq!(config.log_dir(), config.data_dir.join("logs"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
            data_dir = "/var/lib/annosearch"
            seed_file = "/var/lib/annosearch/seed.jsonld"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/annosearch"));
        assert_eq!(config.seed_file, Some(PathBuf::from("/var/lib/annosearch/seed.jsonld")));
        assert_eq!(config.listen_addr, "127.0.0.1:7878");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ServiceConfig::from_toml("listen_addr = 7878").unwrap_err();
        assert!(matches!(err, AnnoError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "listen_addr = \"127.0.0.1:9000\"\nlog_filter = \"annosearch=debug\"\n",
        )
        .unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.log_filter, "annosearch=debug");
    }

    #[test]
    fn test_missing_file_is_error_when_named_directly() {
        let dir = TempDir::new().unwrap();
        let err = ServiceConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = ServiceConfig {
            data_dir: PathBuf::from("/tmp/anno"),
            listen_addr: "127.0.0.1:1234".to_string(),
            seed_file: None,
            log_filter: "warn".to_string(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ServiceConfig::from_toml(&text).unwrap(), config);
    }
}
