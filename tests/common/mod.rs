//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config_admin::config::ServiceConfig;
use config_admin::observability::LogLevelHandle;
use config_admin::{AppState, HttpServer, Shutdown};

pub const API_KEY: &str = "test-admin-key";

/// A running server on an ephemeral port plus the temp site it serves.
pub struct TestServer {
    pub addr: SocketAddr,
    /// Owns every path the server touches; dropped with the test.
    #[allow(dead_code)]
    pub site: tempfile::TempDir,
    pub config_root: PathBuf,
    #[allow(dead_code)]
    pub shutdown: Shutdown,
    /// Completes once the server loop has drained and returned.
    #[allow(dead_code)]
    pub server_task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server over a fresh temp site. The configuration tree starts
/// empty; callers seed it as needed.
pub async fn start_server() -> TestServer {
    let site = tempfile::tempdir().unwrap();
    let config_root = site.path().join("config");
    std::fs::create_dir_all(&config_root).unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.paths.config_root = config_root.clone();
    config.paths.work_dir = site.path().join("work");
    config.admin.api_key = API_KEY.to_string();
    // Small cap keeps the size-rejection test cheap.
    config.limits.max_upload_bytes = 1024 * 1024;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::new(config, LogLevelHandle::detached("info"));
    let _ = state.cache.initialize();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        site,
        config_root,
        shutdown,
        server_task,
    }
}

/// Populate a configuration tree with a few representative files.
#[allow(dead_code)]
pub fn seed_tree(root: &Path) {
    std::fs::create_dir_all(root.join("presets")).unwrap();
    std::fs::write(root.join("app.json"), r#"{"name": "demo", "version": 3}"#).unwrap();
    std::fs::write(root.join("presets/default.json"), r#"{"preset": true}"#).unwrap();
    std::fs::write(
        root.join("models.json"),
        r#"[{"name": "gpt-4o-mini", "enabled": true}]"#,
    )
    .unwrap();
}

/// Client with no connection pooling surprises against the local server.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Authorization header value every admin request needs.
pub fn bearer() -> String {
    format!("Bearer {}", API_KEY)
}
