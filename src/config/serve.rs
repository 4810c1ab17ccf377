//! Immutable serving configuration.
//!
//! `ServeConfig` is built once at startup and shared read-only by every request.
//! Construction checks that the root has an index, that SPA mode and the
//! not-found page are not both requested, and that the not-found page exists.

use std::path::{Component, Path, PathBuf};

use crate::config::loader::ConfigError;
use crate::config::schema::FilesConfig;
use crate::config::validation::parse_custom_headers;
use crate::files::resolver::resolve_relative;
use crate::files::CustomHeaders;

/// Conventional not-found page name.
pub const NOT_FOUND_FILENAME: &str = "404.html";

/// What the request handler serves and how.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    root: PathBuf,
    spa: bool,
    headers: CustomHeaders,
    not_found_file: Option<PathBuf>,
}

impl ServeConfig {
    /// Start building a configuration for `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ServeConfigBuilder {
        ServeConfigBuilder {
            root: root.into(),
            spa: false,
            headers: CustomHeaders::default(),
            not_found_file: None,
        }
    }

    /// Build from the `files` section of the application config.
    pub fn from_files_config(files: &FilesConfig) -> Result<Self, ConfigError> {
        let not_found_file = match (&files.not_found_file, files.not_found) {
            (Some(page), _) => Some(PathBuf::from(page)),
            (None, true) => Some(PathBuf::from(NOT_FOUND_FILENAME)),
            (None, false) => None,
        };

        let mut builder = Self::builder(&files.directory)
            .spa(files.spa)
            .headers(parse_custom_headers(&files.headers));
        if let Some(page) = not_found_file {
            builder = builder.not_found_file(page);
        }
        builder.build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spa(&self) -> bool {
        self.spa
    }

    pub fn headers(&self) -> &CustomHeaders {
        &self.headers
    }

    /// Not-found page, relative to the root.
    pub fn not_found_file(&self) -> Option<&Path> {
        self.not_found_file.as_deref()
    }
}

/// Builder for [`ServeConfig`]; validation happens in [`ServeConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct ServeConfigBuilder {
    root: PathBuf,
    spa: bool,
    headers: CustomHeaders,
    not_found_file: Option<PathBuf>,
}

impl ServeConfigBuilder {
    pub fn spa(mut self, spa: bool) -> Self {
        self.spa = spa;
        self
    }

    pub fn headers(mut self, headers: CustomHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn not_found_file(mut self, page: impl Into<PathBuf>) -> Self {
        self.not_found_file = Some(page.into());
        self
    }

    pub fn build(self) -> Result<ServeConfig, ConfigError> {
        if self.spa && self.not_found_file.is_some() {
            return Err(ConfigError::IncompatibleModes);
        }

        if resolve_relative(&self.root, Path::new("")).is_err() {
            return Err(ConfigError::RootUnreachable(self.root));
        }

        if let Some(page) = &self.not_found_file {
            let inside_root = page
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            if !inside_root {
                return Err(ConfigError::NotFoundOutsideRoot(page.clone()));
            }

            if resolve_relative(&self.root, page).is_err() {
                return Err(ConfigError::NotFoundUnreachable(self.root.join(page)));
            }
        }

        tracing::info!(dir = %self.root.display(), "Serving file");
        if self.spa {
            tracing::info!("Single Page Application mode enabled");
        }
        if let Some(page) = &self.not_found_file {
            tracing::info!(page = %page.display(), "Not found page enabled");
        }

        Ok(ServeConfig {
            root: self.root,
            spa: self.spa,
            headers: self.headers,
            not_found_file: self.not_found_file,
        })
    }
}
