//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response (status < 400):
//!     → headers.rs (content-security-policy, x-frame-options,
//!                   x-content-type-options, x-xss-protection, optional HSTS)
//!     → Send to client
//! ```
//!
//! Traversal rejection lives with path resolution in `files::resolver`.

pub mod headers;

pub use headers::{security_headers_middleware, InvalidSecurityHeader, SecurityHeaders};
