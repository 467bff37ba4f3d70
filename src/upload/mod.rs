//! Upload module for Stowage.
//!
//! This module provides upload placement and storage:
//! - Uploads directory resolution with idempotent creation
//! - Timestamp-and-random file naming with MIME-derived extensions
//! - Media type filter and per-file size limit
//! - Streaming writes that enforce the size limit

mod policy;
mod storage;

pub use policy::{
    ensure_dir, extension_for, generate_file_name, is_allowed_type, resolve_destination,
    resolve_destination_in, UploadPolicy, ALLOWED_EXACT_TYPES, ALLOWED_TYPE_PREFIXES,
    FALLBACK_EXTENSION,
};
pub use storage::{PendingUpload, StoredFile, UploadStorage, DEFAULT_MIME_TYPE};

/// Default maximum file size (20MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;
