//! Test helpers for upload API tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use stowage::config::UploadsConfig;
use stowage::web::handlers::AppState;
use stowage::web::router::{create_health_router, create_router};
use stowage::{UploadPolicy, UploadStorage};

/// A test server whose uploads land in a temporary directory.
pub struct UploadTestServer {
    pub server: TestServer,
    pub uploads_dir: PathBuf,
    _temp_dir: TempDir,
}

impl UploadTestServer {
    /// Start a server with default upload settings.
    pub fn new() -> Self {
        Self::with_config(UploadsConfig::default())
    }

    /// Start a server with the given upload settings.
    pub fn with_config(config: UploadsConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let uploads_dir = temp_dir.path().join(&config.dir);

        let storage = UploadStorage::with_base_path(UploadPolicy::from_config(&config), &uploads_dir)
            .expect("Failed to create upload storage");
        let app_state = Arc::new(AppState::new(storage, &config.field_name));

        let router = create_router(app_state).merge(create_health_router());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            uploads_dir,
            _temp_dir: temp_dir,
        }
    }

    /// Names of the files currently in the uploads directory.
    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .expect("Failed to read uploads dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Whether `name` looks like `<digits>-<digits>.<extension>`.
pub fn is_generated_name(name: &str, extension: &str) -> bool {
    let Some(stem) = name.strip_suffix(&format!(".{extension}")) else {
        return false;
    };
    let Some((millis, random)) = stem.split_once('-') else {
        return false;
    };
    !millis.is_empty()
        && !random.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && random.chars().all(|c| c.is_ascii_digit())
}
