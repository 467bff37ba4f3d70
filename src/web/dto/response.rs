//! Response DTOs for the Web API.

use serde::Serialize;

use crate::upload::StoredFile;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A stored upload as reported to the client.
#[derive(Debug, Serialize)]
pub struct UploadedFileResponse {
    /// Generated name on disk.
    pub filename: String,
    /// Client-supplied file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Declared media type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

impl From<StoredFile> for UploadedFileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            filename: file.filename,
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
        }
    }
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Files stored by the request, in form order.
    pub files: Vec<UploadedFileResponse>,
}
