//! Configuration file management for FormFlow.
//!
//! Supports reading the collaborator endpoint from
//! `~/.config/formflow/config.toml`, with an environment override.

use formflow_core::{FormError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default endpoint of the collaborator services.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the configured endpoint.
pub const SERVER_URL_ENV: &str = "FORMFLOW_SERVER_URL";

/// Root configuration structure for config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFlowConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Collaborator endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl FormFlowConfig {
    /// Resolves the effective configuration.
    ///
    /// Precedence: `FORMFLOW_SERVER_URL` environment variable, then
    /// `~/.config/formflow/config.toml` if present, then the built-in
    /// default endpoint.
    pub fn resolve() -> Result<Self> {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(Self {
                    server: ServerConfig {
                        base_url: url.trim().to_string(),
                    },
                });
            }
        }

        let path = config_path()?;
        if path.exists() {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Loads the configuration from an explicit file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FormError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: FormFlowConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Returns the path to the configuration file: ~/.config/formflow/config.toml
fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FormError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("formflow").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_a_config_error() {
        let err = FormFlowConfig::load_from_path(Path::new("/nonexistent/config.toml"))
            .unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn loads_base_url_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbase_url = \"http://forms.internal:9000\"").unwrap();

        let config = FormFlowConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.server.base_url, "http://forms.internal:9000");
    }

    #[test]
    fn empty_file_falls_back_to_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let config = FormFlowConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_toml_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbase_url = 12").unwrap();

        let err = FormFlowConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, FormError::Serialization { .. }));
    }
}
