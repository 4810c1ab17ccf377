//! Request path to file resolution.
//!
//! # Responsibilities
//! - Reject traversal segments before touching the filesystem
//! - Join the request path onto the root directory
//! - Substitute `index.html` for directories (one level only)
//! - Derive the content type from the file extension

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Index file served in place of a directory.
pub const INDEX_FILENAME: &str = "index.html";

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Why a request path could not be resolved.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The path contains a `..` segment (or is not valid UTF-8 once decoded).
    #[error("path with dots are not allowed")]
    InvalidPath,

    /// Nothing servable exists at the path.
    #[error("no file to serve")]
    NotFound,
}

/// A regular file found under the root, valid for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Filesystem path of the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
    /// Size in bytes at stat time.
    pub len: u64,
    /// Content type derived from the extension.
    pub content_type: String,
}

/// Returns true when any segment of the (percent-decoded) path is `..`.
pub fn has_traversal(request_path: &str) -> bool {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    decoded.split(['/', '\\']).any(|segment| segment == "..")
}

/// Resolve `request_path` under `root` to a regular file.
///
/// Only performs read-only stats, so it is safe to call from many requests at once.
/// A directory resolves to its `index.html`; if that is missing (or is itself a
/// directory) the result is `NotFound`. Directories are never listed.
pub fn resolve(root: &Path, request_path: &str) -> Result<ResolvedFile, ResolveError> {
    let relative = relative_path(request_path)?;
    resolve_relative(root, &relative)
}

/// Resolve an already-decoded path relative to `root`.
///
/// Callers must have rejected `..` components themselves.
pub fn resolve_relative(root: &Path, relative: &Path) -> Result<ResolvedFile, ResolveError> {
    let candidate = root.join(relative);

    let metadata = stat(&candidate)?;
    let (path, metadata) = if metadata.is_dir() {
        let index = candidate.join(INDEX_FILENAME);
        let metadata = stat(&index)?;
        (index, metadata)
    } else {
        (candidate, metadata)
    };

    if !metadata.is_file() {
        tracing::debug!(path = %path.display(), "Not a regular file");
        return Err(ResolveError::NotFound);
    }

    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let content_type = content_type_for(&path);

    Ok(ResolvedFile {
        path,
        modified,
        len: metadata.len(),
        content_type,
    })
}

/// Content type for a path, with a UTF-8 charset on textual types.
pub fn content_type_for(path: &Path) -> String {
    match mime_guess::from_path(path).first() {
        Some(mime) if mime.type_() == mime_guess::mime::TEXT => {
            format!("{}; charset=utf-8", mime.essence_str())
        }
        Some(mime) => mime.essence_str().to_string(),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

fn relative_path(request_path: &str) -> Result<PathBuf, ResolveError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| ResolveError::InvalidPath)?;

    let mut relative = PathBuf::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(ResolveError::InvalidPath),
            segment => relative.push(segment),
        }
    }
    Ok(relative)
}

fn stat(path: &Path) -> Result<fs::Metadata, ResolveError> {
    fs::metadata(path).map_err(|e| {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "Stat failed");
        }
        ResolveError::NotFound
    })
}
