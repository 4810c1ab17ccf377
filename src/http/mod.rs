//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (add request ID)
//!     → health.rs (/health, /ready)
//!     → env.rs (/env, when keys are configured)
//!     → handler.rs (every other path: resolve, fallback, stream file)
//!     → Send to client
//! ```

pub mod env;
pub mod handler;
pub mod health;
pub mod request;
pub mod server;

pub use handler::{serve_handler, FileState, RequestOutcome};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
