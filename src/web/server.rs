//! Web server for Stowage.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::{Result, StowageError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the upload API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server, resolving and creating the uploads directory.
    pub fn new(config: &Config) -> Result<Self> {
        let app_state = AppState::from_config(&config.uploads)?;
        tracing::info!(
            "Upload storage initialized at: {}",
            app_state.storage.base_path().display()
        );
        Self::with_state(config, app_state)
    }

    /// Create a web server around prepared state.
    pub fn with_state(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| StowageError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_router(self.app_state.clone()).merge(create_health_router())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{UploadPolicy, UploadStorage};
    use tempfile::TempDir;

    fn create_test_server() -> (TempDir, WebServer) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;

        let storage = UploadStorage::with_base_path(
            UploadPolicy::from_config(&config.uploads),
            temp_dir.path().join("uploads"),
        )
        .unwrap();
        let server = WebServer::with_state(&config, AppState::new(storage, "media")).unwrap();
        (temp_dir, server)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let (_temp_dir, server) = create_test_server();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        let temp_dir = TempDir::new().unwrap();
        let storage =
            UploadStorage::with_base_path(UploadPolicy::default(), temp_dir.path()).unwrap();

        let result = WebServer::with_state(&config, AppState::new(storage, "media"));
        assert!(matches!(result, Err(StowageError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let (_temp_dir, server) = create_test_server();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
