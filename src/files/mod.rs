//! Static file subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → resolver.rs (traversal check, join with root, directory → index.html)
//!     → shaper.rs (custom headers, Cache-Control, weak ETag, 304 check)
//!     → body.rs (stream file bytes through a pooled buffer)
//!
//! On NotFound:
//!     → fallback.rs (custom 404 page, SPA index, or plain 404)
//! ```
//!
//! # Design Decisions
//! - The filesystem is the only source of truth; nothing is cached across requests
//! - Directory resolution is fixed at depth one (`dir` → `dir/index.html`)
//! - Streaming buffers come from a bounded pool and are returned on drop

pub mod body;
pub mod buffer;
pub mod fallback;
pub mod resolver;
pub mod shaper;

pub use buffer::{BufferPool, PooledBuffer};
pub use fallback::FallbackKind;
pub use resolver::{resolve, ResolveError, ResolvedFile, INDEX_FILENAME};
pub use shaper::{CachePolicy, CustomHeaders, ResponseShaper};
