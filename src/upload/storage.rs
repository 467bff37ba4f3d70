//! Disk storage for uploaded files.
//!
//! Files land flat in the resolved uploads directory under names produced
//! by the placement policy:
//! ```text
//! {uploads_dir}/
//! ├── 1718000000000-123456789.png
//! └── 1718000000417-987654321.bin
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::policy::{ensure_dir, UploadPolicy};
use crate::{Result, StowageError};

/// Media type recorded when the client declares none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file written to the uploads directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated name on disk.
    pub filename: String,
    /// Absolute path of the stored file.
    pub path: PathBuf,
    /// Client-supplied file name, if any.
    pub original_name: Option<String>,
    /// Declared media type.
    pub mime_type: String,
    /// Bytes written.
    pub size: u64,
}

/// Upload storage rooted at the resolved uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    policy: UploadPolicy,
    base_path: PathBuf,
}

impl UploadStorage {
    /// Create storage for `policy`, resolving and creating the uploads directory.
    pub fn new(policy: UploadPolicy) -> Result<Self> {
        let base_path = policy.resolve_destination()?;
        Ok(Self { policy, base_path })
    }

    /// Create storage rooted at an explicit directory instead of the working directory.
    pub fn with_base_path(policy: UploadPolicy, base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        ensure_dir(&base_path)?;
        Ok(Self { policy, base_path })
    }

    /// Absolute uploads directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Placement policy in effect.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Start writing a new file of the given declared type.
    ///
    /// The directory is re-checked first since it may have been removed
    /// after start-up.
    pub async fn begin(
        &self,
        original_name: Option<&str>,
        declared_mime: Option<&str>,
    ) -> Result<PendingUpload> {
        ensure_dir(&self.base_path)?;

        let filename = self.policy.generate_file_name(declared_mime);
        let path = self.base_path.join(&filename);
        let file = File::create(&path).await?;

        tracing::debug!(filename = %filename, "Writing upload");

        Ok(PendingUpload {
            file,
            filename,
            path,
            original_name: original_name.map(str::to_string),
            mime_type: declared_mime.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
            written: 0,
            limit: self.policy.max_file_size(),
        })
    }

    /// Store a complete in-memory file.
    pub async fn store(
        &self,
        content: &[u8],
        original_name: Option<&str>,
        declared_mime: Option<&str>,
    ) -> Result<StoredFile> {
        let mut pending = self.begin(original_name, declared_mime).await?;
        if let Err(e) = pending.write_chunk(content).await {
            pending.abort().await;
            return Err(e);
        }
        pending.finish().await
    }

    /// Full path for a stored name.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.base_path.join(filename)
    }

    /// Check if a stored file exists.
    pub fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    /// Delete a stored file.
    ///
    /// Returns `false` if it didn't exist.
    pub async fn delete(&self, filename: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// A file being streamed to disk.
///
/// Call [`finish`](Self::finish) to keep it or [`abort`](Self::abort) to remove it.
#[derive(Debug)]
pub struct PendingUpload {
    file: File,
    filename: String,
    path: PathBuf,
    original_name: Option<String>,
    mime_type: String,
    written: u64,
    limit: u64,
}

impl PendingUpload {
    /// Generated name of the file being written.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk, failing with [`StowageError::TooLarge`] once the limit is passed.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let total = self.written + chunk.len() as u64;
        if total > self.limit {
            return Err(StowageError::TooLarge { limit: self.limit });
        }

        self.file.write_all(chunk).await?;
        self.written = total;
        Ok(())
    }

    /// Flush and close the file.
    ///
    /// If the data cannot be flushed to disk the file is removed.
    pub async fn finish(mut self) -> Result<StoredFile> {
        let closed = flush_and_sync(&mut self.file).await;
        self.complete(closed).await
    }

    /// Close and remove the partially written file.
    pub async fn abort(self) {
        drop(self.file);
        remove_partial(&self.path).await;
    }

    async fn complete(self, closed: io::Result<()>) -> Result<StoredFile> {
        let PendingUpload {
            file,
            filename,
            path,
            original_name,
            mime_type,
            written,
            ..
        } = self;
        drop(file);

        if let Err(e) = closed {
            tracing::warn!(filename = %filename, error = %e, "Failed to flush upload");
            remove_partial(&path).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            filename,
            path,
            original_name,
            mime_type,
            size: written,
        })
    }
}

async fn flush_and_sync(file: &mut File) -> io::Result<()> {
    file.flush().await?;
    file.sync_all().await
}

async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
        }
    }
}
