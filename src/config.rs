//! Configuration module for Stowage.

use serde::Deserialize;
use std::path::Path;

use crate::upload::DEFAULT_MAX_FILE_SIZE;
use crate::{Result, StowageError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Uploads directory, relative to the working directory or absolute.
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum number of files accepted in one request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Multipart form field carrying the files.
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// Reject media types outside the allow-list instead of admitting everything.
    #[serde(default)]
    pub enforce_allowed_types: bool,
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_files() -> usize {
    5
}

fn default_field_name() -> String {
    "media".to_string()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            max_file_size_bytes: default_max_file_size(),
            max_files: default_max_files(),
            field_name: default_field_name(),
            enforce_allowed_types: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Colourise console output.
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: default_ansi(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StowageError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StowageError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `UPLOAD_DIR`: uploads directory
    /// - `LOG_LEVEL`: log level
    /// - `PORT`: listen port
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` in place of the process environment.
    ///
    /// Empty values are ignored, as is a `PORT` that does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("UPLOAD_DIR") {
            self.uploads.dir = dir;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring unparsable PORT"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.uploads.dir.trim().is_empty() {
            return Err(StowageError::Config("uploads.dir must not be empty".to_string()));
        }
        if self.uploads.max_file_size_bytes == 0 {
            return Err(StowageError::Config(
                "uploads.max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.uploads.max_files == 0 {
            return Err(StowageError::Config(
                "uploads.max_files must be greater than zero".to_string(),
            ));
        }
        if self.uploads.field_name.is_empty() {
            return Err(StowageError::Config(
                "uploads.field_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
