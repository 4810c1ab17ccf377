//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::files::buffer::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_IDLE};

/// Root configuration for the asset server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// What to serve and how.
    pub files: FilesConfig,

    /// Security response headers.
    pub security: SecurityConfig,

    /// CORS policy for the env endpoint.
    pub cors: CorsConfig,

    /// Environment variables exposed on `/env`.
    pub env: EnvConfig,

    /// Response compression.
    pub compression: CompressionConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:1080").
    pub bind_address: String,

    /// Request timeout in seconds (time to produce response headers).
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:1080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory to serve.
    pub directory: String,

    /// Single Page Application mode.
    pub spa: bool,

    /// Serve `404.html` from the directory for missing paths.
    pub not_found: bool,

    /// Explicit not-found page, relative to the directory.
    pub not_found_file: Option<String>,

    /// Custom headers, `name:value`.
    pub headers: Vec<String>,

    /// Streaming buffer size in bytes.
    pub buffer_size: usize,

    /// Idle streaming buffers kept for reuse.
    pub buffer_pool_size: usize,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            directory: "/www/".to_string(),
            spa: false,
            not_found: false,
            not_found_file: None,
            headers: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            buffer_pool_size: DEFAULT_MAX_IDLE,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Content-Security-Policy value.
    pub csp: String,

    /// X-Frame-Options value.
    pub frame_options: String,

    /// Send Strict-Transport-Security.
    pub hsts: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            csp: "default-src 'self'; base-uri 'self'".to_string(),
            frame_options: "deny".to_string(),
            hsts: false,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin, `*` for any.
    pub origin: String,

    /// Allowed methods.
    pub methods: Vec<String>,

    /// Allowed request headers.
    pub headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
            methods: vec!["GET".to_string()],
            headers: vec!["Content-Type".to_string()],
        }
    }
}

/// Env endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EnvConfig {
    /// Variable names to expose; the endpoint is disabled when empty.
    pub keys: Vec<String>,
}

/// Compression configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable gzip compression.
    pub gzip: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { gzip: true }
    }
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Seconds between readiness flipping to 503 and the listener closing.
    pub graceful_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { graceful_secs: 5 }
    }
}
