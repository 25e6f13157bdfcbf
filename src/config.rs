//! Server configuration, loaded from TOML with built-in defaults for every
//! field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::codec::ReadLimits;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Directory served for non-game routes.
    pub public_root: PathBuf,
    pub max_body_bytes: usize,
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 2000,
            public_root: PathBuf::from("./public"),
            max_body_bytes: 8 * 1024,
            read_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    pub fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            max_body_bytes: self.max_body_bytes,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<ServerConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try well-known paths, falling back to the defaults if none load.
pub fn load_default_config() -> ServerConfig {
    let candidates = ["strife.toml", "../strife.toml", "/etc/strife/strife.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded server config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load server config");
                }
            }
        }
    }
    tracing::info!("no strife.toml found, using built-in defaults");
    ServerConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nread_timeout_ms = 250").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.read_timeout_ms, 250);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.max_body_bytes, 8192);
        assert_eq!(config.read_limits().read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.contains("Failed to parse"));

        let missing = load_config(Path::new("/nonexistent/strife.toml")).unwrap_err();
        assert!(missing.contains("Failed to read"));
    }
}
