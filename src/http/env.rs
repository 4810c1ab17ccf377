//! Environment variable exposure endpoint.
//!
//! `GET /env` returns `{"KEY": "value", ...}` for the configured keys, read at
//! request time. Unset keys map to an empty string. `?pretty` indents the output.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::schema::CorsConfig;

/// Keys exposed by the endpoint.
#[derive(Debug, Clone, Default)]
pub struct EnvKeys(Arc<Vec<String>>);

impl EnvKeys {
    /// Trims entries and drops empty ones.
    pub fn new<S: AsRef<str>>(keys: &[S]) -> Self {
        let keys = keys
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        Self(Arc::new(keys))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Current values of the configured keys.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|key| (key.clone(), std::env::var(key).unwrap_or_default()))
            .collect()
    }
}

/// Router serving `/env`, wrapped in CORS.
pub fn env_router(keys: EnvKeys, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/env", get(env_handler).options(preflight))
        .with_state(keys)
        .layer(cors_layer(cors))
}

async fn env_handler(State(keys): State<EnvKeys>, RawQuery(query): RawQuery) -> Response {
    let values = keys.snapshot();
    let pretty = query.is_some_and(|q| {
        q.split('&')
            .any(|p| p == "pretty" || p.starts_with("pretty="))
    });
    let encoded = if pretty {
        serde_json::to_vec_pretty(&values)
    } else {
        serde_json::to_vec(&values)
    };

    let mut response = match encoded {
        Ok(body) => Response::new(Body::from(body)),
        Err(e) => {
            tracing::error!(error = %e, "Encode env failed");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            return response;
        }
    };
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Build the CORS layer, skipping values that are not valid header values.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origins = config
            .origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty() && *o != "*")
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    };

    let methods = config
        .methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.trim().as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                tracing::warn!(method = %m, "Invalid CORS method");
                None
            }
        })
        .collect::<Vec<_>>();

    let headers = config
        .headers
        .iter()
        .filter_map(|h| match HeaderName::from_bytes(h.trim().as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                tracing::warn!(header = %h, "Invalid CORS header");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers))
}
