//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → begin drain (/ready reports 503)
//!                    → wait graceful_secs
//!                    → trigger shutdown
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests finish → exit
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: flip readiness, stop accept, drain
//! - Tests and embedders trigger `Shutdown` directly instead of sending signals

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
