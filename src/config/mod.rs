//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → cli.rs (flags and ASSET_SERVER_* environment variables)
//!     → validation.rs (bind address, custom header parsing)
//!     → serve.rs (ServeConfig: validated, immutable)
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Invalid combinations fail startup instead of being silently overridden

pub mod cli;
pub mod loader;
pub mod schema;
pub mod serve;
pub mod validation;

pub use cli::Args;
pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::{CorsConfig, FilesConfig, ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig};
pub use serve::ServeConfig;
