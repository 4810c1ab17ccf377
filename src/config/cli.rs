//! Command-line and environment overrides.
//!
//! Every flag can also be set through an `ASSET_SERVER_*` environment variable.
//! Flags that are not given leave the file/default value untouched.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{AppConfig, LogFormat};

#[derive(Parser, Debug, Clone)]
#[command(name = "asset-server", version, about = "Static asset server with SPA support", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "ASSET_SERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = "ASSET_SERVER_ADDRESS")]
    pub address: Option<String>,

    /// Directory to serve
    #[arg(short, long, env = "ASSET_SERVER_DIRECTORY")]
    pub directory: Option<String>,

    /// Single Page Application mode
    #[arg(long, env = "ASSET_SERVER_SPA", num_args = 0..=1, default_missing_value = "true")]
    pub spa: Option<bool>,

    /// Serve 404.html from the directory for missing paths
    #[arg(long, env = "ASSET_SERVER_NOT_FOUND", num_args = 0..=1, default_missing_value = "true")]
    pub not_found: Option<bool>,

    /// Explicit not-found page, relative to the directory
    #[arg(long, env = "ASSET_SERVER_NOT_FOUND_FILE")]
    pub not_found_file: Option<String>,

    /// Custom header e.g. content-language:fr (repeatable, newline separated in the env var)
    #[arg(long = "header", env = "ASSET_SERVER_HEADER", value_delimiter = '\n')]
    pub headers: Vec<String>,

    /// Enable gzip compression
    #[arg(long, env = "ASSET_SERVER_GZIP", num_args = 0..=1, default_missing_value = "true")]
    pub gzip: Option<bool>,

    /// Content-Security-Policy value
    #[arg(long, env = "ASSET_SERVER_CSP")]
    pub csp: Option<String>,

    /// X-Frame-Options value
    #[arg(long, env = "ASSET_SERVER_FRAME_OPTIONS")]
    pub frame_options: Option<String>,

    /// Send Strict-Transport-Security
    #[arg(long, env = "ASSET_SERVER_HSTS", num_args = 0..=1, default_missing_value = "true")]
    pub hsts: Option<bool>,

    /// CORS allowed origin for /env
    #[arg(long, env = "ASSET_SERVER_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Environment variables exposed on /env, comma separated
    #[arg(long = "env", env = "ASSET_SERVER_ENV", value_delimiter = ',')]
    pub env_keys: Vec<String>,

    /// Log level
    #[arg(long, env = "ASSET_SERVER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (pretty or json)
    #[arg(long, env = "ASSET_SERVER_LOG_FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Seconds to report not-ready before closing the listener
    #[arg(long, env = "ASSET_SERVER_GRACEFUL_SECS")]
    pub graceful_secs: Option<u64>,
}

impl Args {
    /// Defaults, then the config file (if any), then these overrides.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut AppConfig) {
        if let Some(address) = self.address {
            config.listener.bind_address = address;
        }
        if let Some(directory) = self.directory {
            config.files.directory = directory;
        }
        if let Some(spa) = self.spa {
            config.files.spa = spa;
        }
        if let Some(not_found) = self.not_found {
            config.files.not_found = not_found;
        }
        if self.not_found_file.is_some() {
            config.files.not_found_file = self.not_found_file;
        }
        if !self.headers.is_empty() {
            config.files.headers = self.headers;
        }
        if let Some(gzip) = self.gzip {
            config.compression.gzip = gzip;
        }
        if let Some(csp) = self.csp {
            config.security.csp = csp;
        }
        if let Some(frame_options) = self.frame_options {
            config.security.frame_options = frame_options;
        }
        if let Some(hsts) = self.hsts {
            config.security.hsts = hsts;
        }
        if let Some(origin) = self.cors_origin {
            config.cors.origin = origin;
        }
        if !self.env_keys.is_empty() {
            config.env.keys = self.env_keys;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(secs) = self.graceful_secs {
            config.lifecycle.graceful_secs = secs;
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format {other}, expected pretty or json")),
    }
}
