//! Response header shaping for resolved files.
//!
//! # Responsibilities
//! - Apply configured custom headers, in order, duplicates preserved
//! - Choose `Content-Type` and `Cache-Control` (never overriding a custom value)
//! - Compute the weak ETag and evaluate `If-None-Match`
//!
//! # Header Order
//! ```text
//! custom headers → Content-Type (if absent) → Cache-Control (if absent) → ETag → Last-Modified
//! ```

use std::time::UNIX_EPOCH;

use axum::http::header::{
    CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH, LAST_MODIFIED,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use super::resolver::ResolvedFile;

/// `Cache-Control` for documents that must be revalidated.
pub const NO_CACHE: &str = "no-cache";

/// `Cache-Control` for ordinary assets (10 days).
pub const LONG_CACHE: &str = "public, max-age=864000";

/// Configured custom headers, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomHeaders(Vec<(HeaderName, HeaderValue)>);

impl CustomHeaders {
    pub fn new(entries: Vec<(HeaderName, HeaderValue)>) -> Self {
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.0.iter()
    }

    /// Append every entry, so repeated names produce repeated header lines.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.0 {
            headers.append(name.clone(), value.clone());
        }
    }
}

/// Caching behaviour chosen for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// `no-cache`: site root, SPA fallback and not-found pages.
    Revalidate,
    /// `public, max-age=864000`.
    Long,
}

impl CachePolicy {
    /// Policy for a file found directly at `request_path`.
    pub fn for_path(request_path: &str) -> Self {
        if request_path == "/" {
            CachePolicy::Revalidate
        } else {
            CachePolicy::Long
        }
    }

    pub fn header_value(self) -> HeaderValue {
        match self {
            CachePolicy::Revalidate => HeaderValue::from_static(NO_CACHE),
            CachePolicy::Long => HeaderValue::from_static(LONG_CACHE),
        }
    }
}

/// Weak validator built from size and modification time: `W/"<len>-<mtime>"`.
pub fn weak_etag(file: &ResolvedFile) -> String {
    let modified = file
        .modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("W/\"{:x}-{:x}\"", file.len, modified)
}

/// True when `If-None-Match` is exactly the computed ETag.
pub fn is_not_modified(request_headers: &HeaderMap, etag: &str) -> bool {
    request_headers
        .get(IF_NONE_MATCH)
        .map(|value| value.as_bytes() == etag.as_bytes())
        .unwrap_or(false)
}

/// Writes response headers for a file according to the configured custom headers.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShaper<'a> {
    custom: &'a CustomHeaders,
}

impl<'a> ResponseShaper<'a> {
    pub fn new(custom: &'a CustomHeaders) -> Self {
        Self { custom }
    }

    /// Headers for a `304`: custom headers only.
    pub fn not_modified(&self, headers: &mut HeaderMap) {
        self.custom.apply(headers);
    }

    /// Full header set for a file response.
    ///
    /// `etag` is omitted for responses that are not revalidated (custom 404 page).
    pub fn file(
        &self,
        headers: &mut HeaderMap,
        file: &ResolvedFile,
        cache: CachePolicy,
        etag: Option<&str>,
    ) {
        self.custom.apply(headers);

        if !headers.contains_key(CONTENT_TYPE) {
            if let Ok(content_type) = HeaderValue::from_str(&file.content_type) {
                headers.insert(CONTENT_TYPE, content_type);
            }
        }

        if !headers.contains_key(CACHE_CONTROL) {
            headers.insert(CACHE_CONTROL, cache.header_value());
        }

        if let Some(etag) = etag.and_then(|e| HeaderValue::from_str(e).ok()) {
            headers.insert(ETAG, etag);
        }

        if let Ok(modified) = HeaderValue::from_str(&httpdate::fmt_http_date(file.modified)) {
            headers.insert(LAST_MODIFIED, modified);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn file(len: u64, secs: u64) -> ResolvedFile {
        ResolvedFile {
            path: PathBuf::from("/srv/app.js"),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            len,
            content_type: "text/javascript; charset=utf-8".to_string(),
        }
    }

    fn custom(entries: &[(&'static str, &'static str)]) -> CustomHeaders {
        CustomHeaders::new(
            entries
                .iter()
                .map(|&(n, v)| (HeaderName::from_static(n), HeaderValue::from_static(v)))
                .collect(),
        )
    }

    #[test]
    fn etag_is_weak_and_tracks_metadata() {
        let etag = weak_etag(&file(26, 1));
        assert_eq!(etag, "W/\"1a-3b9aca00\"");
        assert_ne!(etag, weak_etag(&file(27, 1)));
        assert_ne!(etag, weak_etag(&file(26, 2)));
    }

    #[test]
    fn if_none_match_requires_exact_value() {
        let etag = weak_etag(&file(10, 10));
        let mut headers = HeaderMap::new();
        assert!(!is_not_modified(&headers, &etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_str(&etag).unwrap());
        assert!(is_not_modified(&headers, &etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(!is_not_modified(&headers, &etag));
    }

    #[test]
    fn cache_policy_by_path() {
        assert_eq!(CachePolicy::for_path("/"), CachePolicy::Revalidate);
        assert_eq!(CachePolicy::for_path("/app.js"), CachePolicy::Long);
        assert_eq!(CachePolicy::for_path("/docs/"), CachePolicy::Long);
    }

    #[test]
    fn custom_cache_control_wins() {
        let custom = custom(&[("cache-control", "private")]);
        let mut headers = HeaderMap::new();
        ResponseShaper::new(&custom).file(&mut headers, &file(1, 1), CachePolicy::Long, None);
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "private");
        assert_eq!(headers.get_all(CACHE_CONTROL).iter().count(), 1);
    }

    #[test]
    fn custom_content_type_wins() {
        let custom = custom(&[("content-type", "application/wasm")]);
        let mut headers = HeaderMap::new();
        ResponseShaper::new(&custom).file(&mut headers, &file(1, 1), CachePolicy::Long, None);
        let values: Vec<_> = headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/wasm"]);
    }

    #[test]
    fn file_headers() {
        let custom = CustomHeaders::default();
        let f = file(5, 5);
        let etag = weak_etag(&f);
        let mut headers = HeaderMap::new();
        ResponseShaper::new(&custom).file(&mut headers, &f, CachePolicy::Long, Some(&etag));

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/javascript; charset=utf-8");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), LONG_CACHE);
        assert_eq!(headers.get(ETAG).unwrap(), etag.as_str());
        assert_eq!(headers.get(LAST_MODIFIED).unwrap(), "Thu, 01 Jan 1970 00:00:05 GMT");
    }

    #[test]
    fn duplicate_custom_headers_keep_order() {
        let custom = custom(&[("link", "</a.css>"), ("x-one", "1"), ("link", "</b.js>")]);
        let mut headers = HeaderMap::new();
        ResponseShaper::new(&custom).not_modified(&mut headers);

        let links: Vec<_> = headers.get_all("link").iter().collect();
        assert_eq!(links, vec!["</a.css>", "</b.js>"]);
        assert!(headers.get(ETAG).is_none());
    }
}
