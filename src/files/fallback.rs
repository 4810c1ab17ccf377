//! What to serve when a path does not resolve.
//!
//! # Decision Order
//! ```text
//! not-found page configured and resolvable → 404 with that page
//! SPA mode and root index resolvable       → 200 with the root index
//! otherwise                                → plain 404
//! ```
//!
//! The not-found page and SPA mode are mutually exclusive at configuration time,
//! so at most one of the first two branches can apply.

use std::path::Path;

use axum::http::StatusCode;

use super::resolver::{resolve_relative, ResolvedFile};
use super::shaper::CachePolicy;
use crate::config::ServeConfig;

/// Fallback chosen for an unresolved GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackKind {
    /// The configured not-found page, served with 404.
    CustomNotFound(ResolvedFile),
    /// The root index, served with 200 for client-side routing.
    SpaIndex(ResolvedFile),
    /// Minimal text 404.
    PlainNotFound,
}

impl FallbackKind {
    /// Pick the fallback for `config`. Performs blocking stats.
    pub fn select(config: &ServeConfig) -> Self {
        if let Some(page) = config.not_found_file() {
            return match resolve_relative(config.root(), page) {
                Ok(file) => FallbackKind::CustomNotFound(file),
                Err(_) => {
                    tracing::warn!(page = %page.display(), "Not found page is unreachable");
                    FallbackKind::PlainNotFound
                }
            };
        }

        if config.spa() {
            return match resolve_relative(config.root(), Path::new("")) {
                Ok(file) => FallbackKind::SpaIndex(file),
                Err(_) => {
                    tracing::warn!(root = %config.root().display(), "SPA index is unreachable");
                    FallbackKind::PlainNotFound
                }
            };
        }

        FallbackKind::PlainNotFound
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FallbackKind::SpaIndex(_) => StatusCode::OK,
            FallbackKind::CustomNotFound(_) | FallbackKind::PlainNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Fallback responses are always revalidated.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::Revalidate
    }
}
