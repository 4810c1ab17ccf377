//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;

use asset_server::config::{AppConfig, ServeConfig};
use asset_server::lifecycle::Shutdown;
use asset_server::HttpServer;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const INDEX: &str = "<!doctype html><title>home</title>";
pub const APP_JS: &str = "console.log('app');";
pub const DOCS: &str = "<h1>docs</h1>";
pub const NOT_FOUND_PAGE: &str = "<h1>nothing here</h1>";

/// A small site:
///
/// ```text
/// index.html
/// app.js
/// style.css      (large enough to be compressed)
/// 404.html
/// docs/index.html
/// empty/
/// ```
pub fn fixture_site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("index.html"), INDEX).unwrap();
    fs::write(root.join("app.js"), APP_JS).unwrap();
    fs::write(root.join("style.css"), "body { margin: 0; }\n".repeat(200)).unwrap();
    fs::write(root.join("404.html"), NOT_FOUND_PAGE).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("docs/index.html"), DOCS).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    dir
}

/// Config used by tests: no compression unless a test turns it on.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.compression.gzip = false;
    config
}

/// A server running in the background.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Bind an ephemeral port and serve `serve` with `config`.
pub async fn spawn_server(config: AppConfig, serve: ServeConfig) -> TestServer {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, serve, shutdown.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Serve `site` with default options.
pub async fn spawn_default(site: &TempDir) -> TestServer {
    let serve = ServeConfig::builder(site.path()).build().unwrap();
    spawn_server(test_config(), serve).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
