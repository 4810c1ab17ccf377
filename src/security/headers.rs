//! Security response headers.
//!
//! # Responsibilities
//! - Build the fixed header set once from configuration
//! - Add it to every response with a status below 400
//!
//! # Design Decisions
//! - Values are validated at startup; an invalid configured value aborts startup
//! - Headers are inserted, so a response never carries them twice
//! - Runs as the outermost response layer around the file handler and `/env`

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{
    CONTENT_SECURITY_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
    X_XSS_PROTECTION,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use crate::config::schema::SecurityConfig;

/// HSTS value sent when enabled.
pub const HSTS_VALUE: &str = "max-age=10886400";

#[derive(Debug, Error)]
#[error("Invalid {name} header value: {value:?}")]
pub struct InvalidSecurityHeader {
    pub name: &'static str,
    pub value: String,
}

/// The fixed set of defensive response headers.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(config: &SecurityConfig) -> Result<Self, InvalidSecurityHeader> {
        let csp = configured_value("content-security-policy", &config.csp)?;
        let frame_options = configured_value("x-frame-options", &config.frame_options)?;

        let mut entries = vec![
            (CONTENT_SECURITY_POLICY, csp),
            (X_FRAME_OPTIONS, frame_options),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        ];
        if config.hsts {
            entries.push((STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS_VALUE)));
        }

        Ok(Self { entries })
    }

    /// Insert the headers, replacing any existing value.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn configured_value(name: &'static str, value: &str) -> Result<HeaderValue, InvalidSecurityHeader> {
    HeaderValue::from_str(value).map_err(|_| InvalidSecurityHeader {
        name,
        value: value.to_string(),
    })
}

/// Middleware adding security headers to non-error responses.
pub async fn security_headers_middleware(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if response.status().as_u16() < 400 {
        headers.apply(response.headers_mut());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SecurityHeaders {
        SecurityHeaders::from_config(&SecurityConfig::default()).unwrap()
    }

    #[test]
    fn default_set() {
        let security = defaults();
        let mut headers = HeaderMap::new();
        security.apply(&mut headers);

        assert_eq!(security.len(), 4);
        assert_eq!(
            headers.get(CONTENT_SECURITY_POLICY).unwrap(),
            "default-src 'self'; base-uri 'self'"
        );
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "deny");
        assert_eq!(headers.get(X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(X_XSS_PROTECTION).unwrap(), "1; mode=block");
        assert!(headers.get(STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[test]
    fn hsts_when_enabled() {
        let config = SecurityConfig {
            hsts: true,
            ..SecurityConfig::default()
        };
        let security = SecurityHeaders::from_config(&config).unwrap();
        let mut headers = HeaderMap::new();
        security.apply(&mut headers);
        assert_eq!(headers.get(STRICT_TRANSPORT_SECURITY).unwrap(), HSTS_VALUE);
    }

    #[test]
    fn apply_replaces_existing() {
        let mut headers = HeaderMap::new();
        headers.append(X_FRAME_OPTIONS, HeaderValue::from_static("sameorigin"));
        headers.append(X_FRAME_OPTIONS, HeaderValue::from_static("allow-from x"));

        defaults().apply(&mut headers);
        defaults().apply(&mut headers);
        let values: Vec<_> = headers.get_all(X_FRAME_OPTIONS).iter().collect();
        assert_eq!(values, vec!["deny"]);
    }

    #[test]
    fn invalid_value_is_rejected() {
        let config = SecurityConfig {
            csp: "default-src\n'self'".to_string(),
            ..SecurityConfig::default()
        };
        let err = SecurityHeaders::from_config(&config).unwrap_err();
        assert_eq!(err.name, "content-security-policy");
    }
}
