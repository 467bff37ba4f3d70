//! Upload placement policy tests against the public API.

mod common;

use std::path::PathBuf;

use stowage::config::UploadsConfig;
use stowage::upload::{generate_file_name, resolve_destination, resolve_destination_in};
use stowage::web::handlers::AppState;
use stowage::{UploadPolicy, UploadStorage};
use tempfile::TempDir;

use common::is_generated_name;

#[test]
fn test_destination_created_and_reused() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("var").join("uploads");

    let first = resolve_destination(&target).unwrap();
    let second = resolve_destination(&target).unwrap();

    assert!(first.is_dir());
    assert_eq!(first, second);
}

/// A relative directory name unique to this test run, removed on drop.
struct RelativeDir {
    name: String,
}

impl RelativeDir {
    fn new(label: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        Self {
            name: format!("target/stowage-{label}-{}-{nanos}", std::process::id()),
        }
    }

    fn expected(&self) -> PathBuf {
        std::env::current_dir().unwrap().join(&self.name)
    }
}

impl Drop for RelativeDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.expected());
    }
}

#[test]
fn test_destination_relative_to_working_directory() {
    let dir = RelativeDir::new("resolve");
    assert!(!dir.expected().exists());

    let resolved = resolve_destination(&dir.name).unwrap();

    assert_eq!(resolved, dir.expected());
    assert!(resolved.is_absolute());
    assert!(resolved.is_dir());

    let again = resolve_destination(&dir.name).unwrap();
    assert_eq!(again, resolved);
}

#[test]
fn test_storage_new_uses_working_directory() {
    let dir = RelativeDir::new("storage");
    let policy = UploadPolicy::from_config(&UploadsConfig {
        dir: dir.name.clone(),
        ..Default::default()
    });

    let storage = UploadStorage::new(policy).unwrap();

    assert_eq!(storage.base_path(), dir.expected());
    assert!(storage.base_path().is_dir());
}

#[test]
fn test_app_state_from_config() {
    let dir = RelativeDir::new("state");
    let config = UploadsConfig {
        dir: dir.name.clone(),
        field_name: "image".to_string(),
        ..Default::default()
    };

    let state = AppState::from_config(&config).unwrap();

    assert_eq!(state.field_name, "image");
    assert_eq!(state.storage.base_path(), dir.expected());
    assert!(dir.expected().is_dir());
}

#[test]
fn test_destination_relative_to_base() {
    let temp_dir = TempDir::new().unwrap();

    let dir = resolve_destination_in(temp_dir.path(), "uploads").unwrap();

    assert!(dir.starts_with(temp_dir.path()));
    assert!(dir.ends_with("uploads"));
}

#[test]
fn test_generated_names() {
    assert!(is_generated_name(&generate_file_name(Some("image/png")), "png"));
    assert!(is_generated_name(&generate_file_name(Some("application/pdf")), "pdf"));
    assert!(is_generated_name(
        &generate_file_name(Some("application/x-totally-unknown")),
        "bin"
    ));
    assert!(is_generated_name(&generate_file_name(None), "bin"));
}

#[test]
fn test_filter_modes() {
    let permissive = UploadPolicy::default();
    let strict = UploadPolicy::from_config(&UploadsConfig {
        enforce_allowed_types: true,
        ..Default::default()
    });

    for mime in ["image/gif", "video/mp4", "application/pdf", "text/plain"] {
        assert!(permissive.accept_file(mime));
        assert!(strict.accept_file(mime));
    }
    for mime in ["application/zip", "application/json", "audio/mpeg"] {
        assert!(permissive.accept_file(mime));
        assert!(!strict.accept_file(mime));
    }
}

#[test]
fn test_default_size_limit() {
    let policy = UploadPolicy::default();
    let limit = 20 * 1024 * 1024;

    assert!(!policy.exceeds_size_limit(limit));
    assert!(policy.exceeds_size_limit(limit + 1));
}
