//! Stowage - HTTP upload intake
//!
//! Accepts multipart uploads and places them on disk under generated,
//! MIME-derived names, enforcing a per-file size limit.

pub mod config;
pub mod error;
pub mod logging;
pub mod upload;
pub mod web;

pub use config::Config;
pub use error::{Result, StowageError};
pub use upload::{StoredFile, UploadPolicy, UploadStorage};
pub use web::{ApiError, WebServer};
