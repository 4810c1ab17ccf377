//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse raw `name:value` custom headers, dropping malformed ones
//! - Check the listener address before anything binds
//!
//! # Design Decisions
//! - Malformed custom headers are warnings, never fatal
//! - Everything else that fails here aborts startup

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};

use crate::config::loader::ConfigError;
use crate::config::schema::AppConfig;
use crate::files::CustomHeaders;

/// Parse one raw header entry, split on the first colon.
///
/// Returns `None` for entries without a colon, with whitespace in the name, or
/// with a name/value that is not a valid HTTP header.
pub fn parse_header(raw: &str) -> Option<(HeaderName, HeaderValue)> {
    let (name, value) = raw.split_once(':')?;
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }

    let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
    let value = HeaderValue::from_str(value.trim()).ok()?;
    Some((name, value))
}

/// Parse all configured custom headers, logging and skipping malformed entries.
pub fn parse_custom_headers<S: AsRef<str>>(raw: &[S]) -> CustomHeaders {
    let mut entries = Vec::with_capacity(raw.len());
    for header in raw {
        let header = header.as_ref();
        match parse_header(header) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(header = %header, "Header has wrong format"),
        }
    }
    CustomHeaders::new(entries)
}

/// Validate the parts of the configuration not covered by `ServeConfig`.
pub fn validate_config(config: &AppConfig) -> Result<SocketAddr, ConfigError> {
    config
        .listener
        .bind_address
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::BindAddress {
            address: config.listener.bind_address.clone(),
            reason: e.to_string(),
        })
}
