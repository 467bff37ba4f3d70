//! API handlers for the Web API.

pub mod upload;

pub use upload::*;

use crate::config::UploadsConfig;
use crate::upload::{UploadPolicy, UploadStorage};
use crate::Result;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage for accepted uploads.
    pub storage: UploadStorage,
    /// Multipart field carrying files.
    pub field_name: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(storage: UploadStorage, field_name: impl Into<String>) -> Self {
        Self {
            storage,
            field_name: field_name.into(),
        }
    }

    /// Build state from the uploads configuration, creating the uploads directory.
    pub fn from_config(config: &UploadsConfig) -> Result<Self> {
        let storage = UploadStorage::new(UploadPolicy::from_config(config))?;
        Ok(Self::new(storage, &config.field_name))
    }
}
