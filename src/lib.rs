//! Static asset server library.
//!
//! Serves a directory over HTTP with validator-based caching, directory
//! indexes, and a not-found policy (plain 404, a custom page, or SPA index).

pub mod config;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::{AppConfig, ServeConfig};
pub use files::resolve;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
