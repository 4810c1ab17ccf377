//! Static file request handler.
//!
//! # Request States
//! ```text
//! MethodCheck → TraversalCheck → Resolve → {Serve | Fallback} → Respond
//! ```
//!
//! `decide` runs the first four states and only stats the filesystem;
//! `respond` opens files and builds the response. A `304` is decided before
//! any file is opened, and a file is opened before any success status exists,
//! so an open failure still becomes a clean `500`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use tokio::fs::File;

use crate::config::ServeConfig;
use crate::files::body::file_body;
use crate::files::resolver::{has_traversal, resolve};
use crate::files::shaper::{is_not_modified, weak_etag};
use crate::files::{BufferPool, CachePolicy, FallbackKind, ResolveError, ResolvedFile, ResponseShaper};

/// Shared, read-only state of the static file handler.
#[derive(Debug)]
pub struct FileState {
    pub config: ServeConfig,
    pub buffers: Arc<BufferPool>,
}

impl FileState {
    pub fn new(config: ServeConfig, buffers: Arc<BufferPool>) -> Self {
        Self { config, buffers }
    }
}

/// What the handler decided to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// GET on a resolved file.
    ServeFile { file: ResolvedFile, cache: CachePolicy },
    /// HEAD on a resolved file: headers only, `204`.
    ServeExists { file: ResolvedFile, cache: CachePolicy },
    /// `If-None-Match` matched.
    ServeNotModified,
    /// Path did not resolve on a GET.
    ServeFallback(FallbackKind),
    /// Rejected before or during resolution.
    ServeError(StatusCode),
}

/// Axum entry point for every static file request.
pub async fn serve_handler(
    State(state): State<Arc<FileState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let outcome = decide(&state, &method, uri.path(), &headers).await;
    tracing::debug!(method = %method, path = %uri.path(), outcome = ?outcome, "Request decided");
    respond(&state, outcome).await
}

/// Run method, traversal, resolution and fallback checks for a request.
pub async fn decide(
    state: &Arc<FileState>,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
) -> RequestOutcome {
    if method != Method::GET && method != Method::HEAD {
        return RequestOutcome::ServeError(StatusCode::METHOD_NOT_ALLOWED);
    }

    if has_traversal(path) {
        tracing::warn!(path = %path, "Path traversal rejected");
        return RequestOutcome::ServeError(StatusCode::BAD_REQUEST);
    }

    let lookup = Arc::clone(state);
    let request_path = path.to_string();
    let resolved = tokio::task::spawn_blocking(move || {
        resolve(lookup.config.root(), &request_path)
    })
    .await;

    let resolved = match resolved {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Resolve task failed");
            return RequestOutcome::ServeError(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match resolved {
        Ok(file) if method == Method::HEAD => RequestOutcome::ServeExists {
            file,
            cache: CachePolicy::for_path(path),
        },
        Ok(file) => {
            if is_not_modified(headers, &weak_etag(&file)) {
                return RequestOutcome::ServeNotModified;
            }
            RequestOutcome::ServeFile {
                file,
                cache: CachePolicy::for_path(path),
            }
        }
        Err(ResolveError::InvalidPath) => RequestOutcome::ServeError(StatusCode::BAD_REQUEST),
        Err(ResolveError::NotFound) if method == Method::HEAD => {
            RequestOutcome::ServeError(StatusCode::NOT_FOUND)
        }
        Err(ResolveError::NotFound) => fallback(state, headers).await,
    }
}

async fn fallback(state: &Arc<FileState>, headers: &HeaderMap) -> RequestOutcome {
    let lookup = Arc::clone(state);
    let selected = tokio::task::spawn_blocking(move || FallbackKind::select(&lookup.config)).await;

    match selected {
        Ok(FallbackKind::SpaIndex(file)) if is_not_modified(headers, &weak_etag(&file)) => {
            RequestOutcome::ServeNotModified
        }
        Ok(kind) => RequestOutcome::ServeFallback(kind),
        Err(e) => {
            tracing::error!(error = %e, "Fallback task failed");
            RequestOutcome::ServeError(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Turn an outcome into a response, streaming file bodies.
pub async fn respond(state: &FileState, outcome: RequestOutcome) -> Response {
    let shaper = ResponseShaper::new(state.config.headers());

    match outcome {
        RequestOutcome::ServeFile { file, cache } => {
            let etag = weak_etag(&file);
            send_file(state, &file, StatusCode::OK, cache, Some(&etag)).await
        }
        RequestOutcome::ServeExists { file, cache } => {
            let etag = weak_etag(&file);
            let mut response = status_response(StatusCode::NO_CONTENT, Body::empty());
            shaper.file(response.headers_mut(), &file, cache, Some(&etag));
            response
        }
        RequestOutcome::ServeNotModified => {
            let mut response = status_response(StatusCode::NOT_MODIFIED, Body::empty());
            shaper.not_modified(response.headers_mut());
            response
        }
        RequestOutcome::ServeFallback(kind) => {
            let status = kind.status();
            let cache = kind.cache_policy();
            match kind {
                FallbackKind::CustomNotFound(file) => {
                    send_file(state, &file, status, cache, None).await
                }
                FallbackKind::SpaIndex(file) => {
                    let etag = weak_etag(&file);
                    send_file(state, &file, status, cache, Some(&etag)).await
                }
                FallbackKind::PlainNotFound => text_response(status, "404 page not found"),
            }
        }
        RequestOutcome::ServeError(status) if status == StatusCode::METHOD_NOT_ALLOWED => {
            let mut response = status_response(status, Body::empty());
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            response
        }
        RequestOutcome::ServeError(status) if status == StatusCode::BAD_REQUEST => {
            text_response(status, "path with dots are not allowed")
        }
        RequestOutcome::ServeError(status) => status_response(status, Body::empty()),
    }
}

async fn send_file(
    state: &FileState,
    file: &ResolvedFile,
    status: StatusCode,
    cache: CachePolicy,
    etag: Option<&str>,
) -> Response {
    let handle = match File::open(&file.path).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(path = %file.path.display(), error = %e, "Open file failed");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };
    let length = match handle.metadata().await {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            tracing::error!(path = %file.path.display(), error = %e, "Read file metadata failed");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };

    let body = file_body(handle, state.buffers.acquire(), file.path.clone());
    let mut response = status_response(status, body);
    let headers = response.headers_mut();
    ResponseShaper::new(state.config.headers()).file(headers, file, cache, etag);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn status_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn text_response(status: StatusCode, text: &'static str) -> Response {
    let mut response = status_response(status, Body::from(text));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH};
    use std::fs::{create_dir_all, write};

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        write(dir.path().join("app.js"), "console.log(1)").unwrap();
        create_dir_all(dir.path().join("empty")).unwrap();
        dir
    }

    fn state(config: ServeConfig) -> Arc<FileState> {
        Arc::new(FileState::new(config, BufferPool::new(64, 4)))
    }

    #[tokio::test]
    async fn rejects_other_methods_before_resolution() {
        let state = state(ServeConfig::builder(site().path()).build().unwrap());
        let outcome = decide(&state, &Method::POST, "/app.js", &HeaderMap::new()).await;
        assert_eq!(outcome, RequestOutcome::ServeError(StatusCode::METHOD_NOT_ALLOWED));

        let response = respond(&state, outcome).await;
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }

    #[tokio::test]
    async fn rejects_traversal() {
        let state = state(ServeConfig::builder(site().path()).build().unwrap());
        for path in ["/../secret", "/a/%2e%2e/b", "/.."] {
            let outcome = decide(&state, &Method::GET, path, &HeaderMap::new()).await;
            assert_eq!(outcome, RequestOutcome::ServeError(StatusCode::BAD_REQUEST), "{path}");
        }
    }

    #[tokio::test]
    async fn get_serves_file_with_long_cache() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).build().unwrap());
        match decide(&state, &Method::GET, "/app.js", &HeaderMap::new()).await {
            RequestOutcome::ServeFile { file, cache } => {
                assert_eq!(file.path, site.path().join("app.js"));
                assert_eq!(cache, CachePolicy::Long);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn root_is_revalidated() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).build().unwrap());
        let outcome = decide(&state, &Method::GET, "/", &HeaderMap::new()).await;
        let response = respond(&state, outcome).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "13");
    }

    #[tokio::test]
    async fn matching_etag_short_circuits() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).build().unwrap());
        let file = resolve(site.path(), "/app.js").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_str(&weak_etag(&file)).unwrap());
        let outcome = decide(&state, &Method::GET, "/app.js", &headers).await;
        assert_eq!(outcome, RequestOutcome::ServeNotModified);

        let response = respond(&state, outcome).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(ETAG).is_none());
    }

    #[tokio::test]
    async fn head_found_and_missing() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).spa(true).build().unwrap());

        let outcome = decide(&state, &Method::HEAD, "/app.js", &HeaderMap::new()).await;
        let response = respond(&state, outcome).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(ETAG).is_some());

        let outcome = decide(&state, &Method::HEAD, "/client/route", &HeaderMap::new()).await;
        assert_eq!(outcome, RequestOutcome::ServeError(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn directory_without_index_falls_back() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).build().unwrap());
        let outcome = decide(&state, &Method::GET, "/empty/", &HeaderMap::new()).await;
        assert_eq!(outcome, RequestOutcome::ServeFallback(FallbackKind::PlainNotFound));
    }

    #[tokio::test]
    async fn vanished_file_is_server_error() {
        let site = site();
        let state = state(ServeConfig::builder(site.path()).build().unwrap());
        let outcome = decide(&state, &Method::GET, "/app.js", &HeaderMap::new()).await;
        std::fs::remove_file(site.path().join("app.js")).unwrap();

        let response = respond(&state, outcome).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.buffers.idle_count(), 0);
    }
}
