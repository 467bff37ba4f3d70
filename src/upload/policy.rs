//! Upload placement policy.
//!
//! Decides where an incoming file is persisted, what it is called on disk,
//! whether its declared media type is admitted, and how large it may be.
//! Stored names have the form:
//! ```text
//! {epoch-millis}-{random in [0, 1e9)}.{extension}
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::UploadsConfig;
use crate::Result;

/// Extension used when the declared media type has no known mapping.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Media type prefixes the allow-list admits.
pub const ALLOWED_TYPE_PREFIXES: &[&str] = &["image/", "video/"];

/// Exact media types the allow-list admits.
pub const ALLOWED_EXACT_TYPES: &[&str] = &["application/pdf", "text/plain"];

/// Upper bound (exclusive) of the random component of stored names.
const RANDOM_BOUND: u32 = 1_000_000_000;

/// Canonical extensions for types where the mapping table lists several.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/octet-stream", "bin"),
    ("audio/mpeg", "mp3"),
    ("image/jpeg", "jpeg"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("video/quicktime", "mov"),
    ("video/x-msvideo", "avi"),
];

/// Placement policy for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    uploads_dir: PathBuf,
    max_file_size: u64,
    max_files: usize,
    enforce_allowed_types: bool,
}

impl UploadPolicy {
    /// Create a policy from the uploads configuration.
    pub fn from_config(config: &UploadsConfig) -> Self {
        Self {
            uploads_dir: PathBuf::from(&config.dir),
            max_file_size: config.max_file_size_bytes,
            max_files: config.max_files,
            enforce_allowed_types: config.enforce_allowed_types,
        }
    }

    /// Configured uploads directory, as written in the configuration.
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Maximum size of a single file in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Maximum number of files per request.
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Whether the allow-list is enforced.
    pub fn enforces_allowed_types(&self) -> bool {
        self.enforce_allowed_types
    }

    /// Resolve the uploads directory against the working directory and make sure it exists.
    pub fn resolve_destination(&self) -> Result<PathBuf> {
        resolve_destination(&self.uploads_dir)
    }

    /// Generate a stored name for a file of the given declared type.
    pub fn generate_file_name(&self, declared_mime: Option<&str>) -> String {
        generate_file_name(declared_mime)
    }

    /// Decide whether a file of the given declared type is admitted.
    ///
    /// Unless the allow-list is enforced every type is admitted; types outside
    /// the list are logged so the permissive behaviour stays visible.
    pub fn accept_file(&self, declared_mime: &str) -> bool {
        let allowed = is_allowed_type(declared_mime);
        if self.enforce_allowed_types {
            return allowed;
        }
        if !allowed {
            tracing::debug!(
                mime_type = declared_mime,
                "Admitting media type outside the allow-list"
            );
        }
        true
    }

    /// Whether `size` bytes is over the per-file limit.
    pub fn exceeds_size_limit(&self, size: u64) -> bool {
        size > self.max_file_size
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&UploadsConfig::default())
    }
}

/// Join `dir` onto the current working directory and ensure the result exists.
///
/// An absolute `dir` is used as-is.
pub fn resolve_destination(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    resolve_destination_in(cwd, dir)
}

/// Join `dir` onto `base` and ensure the result exists.
pub fn resolve_destination_in(base: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = base.as_ref().join(dir.as_ref());
    ensure_dir(&path)?;
    Ok(path)
}

/// Create `path` and any missing parents.
///
/// A concurrent creator winning the race is not an error; anything else is.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Generate `{epoch-millis}-{random}.{extension}` for the declared type.
pub fn generate_file_name(declared_mime: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = rand::rng().random_range(0..RANDOM_BOUND);
    let ext = extension_for(declared_mime);
    format!("{millis}-{random}.{ext}")
}

/// Resolve a file extension from a declared media type.
///
/// Parameters such as `; charset=utf-8` are ignored. Falls back to
/// [`FALLBACK_EXTENSION`] for absent or unknown types.
pub fn extension_for(declared_mime: Option<&str>) -> &'static str {
    declared_mime
        .map(essence)
        .filter(|m| !m.is_empty())
        .and_then(|m| lookup_extension(&m))
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Whether the declared type is on the allow-list.
pub fn is_allowed_type(declared_mime: &str) -> bool {
    let mime = essence(declared_mime);
    ALLOWED_TYPE_PREFIXES.iter().any(|p| mime.starts_with(p))
        || ALLOWED_EXACT_TYPES.contains(&mime.as_str())
}

/// Lowercased `type/subtype` without parameters.
fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

fn lookup_extension(mime: &str) -> Option<&'static str> {
    // Wildcards name a range of types, not one type with an extension.
    let (top, sub) = mime.split_once('/')?;
    if top.is_empty() || sub.is_empty() || top.contains('*') || sub.contains('*') {
        return None;
    }

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(m, _)| *m == mime) {
        return Some(*ext);
    }

    let candidates: Vec<&'static str> = mime_guess::get_mime_extensions_str(mime)?
        .iter()
        .copied()
        .filter(|ext| is_safe_extension(ext))
        .collect();

    // "svg+xml" -> "svg"
    let subtype = sub.split('+').next().unwrap_or(sub);

    candidates
        .iter()
        .copied()
        .find(|ext| *ext == subtype)
        .or_else(|| candidates.first().copied())
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
