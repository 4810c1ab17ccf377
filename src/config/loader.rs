//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::security::InvalidSecurityHeader;

/// Error type for configuration loading and validation.
///
/// Every variant is fatal: the server refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid bind address {address}: {reason}")]
    BindAddress { address: String, reason: String },

    #[error("Directory {} is unreachable or does not contain index", .0.display())]
    RootUnreachable(PathBuf),

    #[error("Incompatible options provided: not found page and SPA mode")]
    IncompatibleModes,

    #[error("Not found page {} is unreachable", .0.display())]
    NotFoundUnreachable(PathBuf),

    #[error("Not found page {} must stay inside the served directory", .0.display())]
    NotFoundOutsideRoot(PathBuf),

    #[error(transparent)]
    SecurityHeader(#[from] InvalidSecurityHeader),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "[files]\nspa = true\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.files.spa);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "[files\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
