use std::path::PathBuf;

use thiserror::Error;

/// Errors that can end a validation run
///
/// Per-file problems are not errors at this level: they are recorded as
/// [`ValidationResult::Invalid`](crate::validator::ValidationResult) and the run keeps going.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("No files ending in '{suffix}' found in {}", path.display())]
    NoFilesFound { path: PathBuf, suffix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system traversal error: {} - {reason}", path.display())]
    FileSystemTraversal { path: PathBuf, reason: String },
}

impl ValidationError {
    /// True for the two failures detected before any file is checked.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ValidationError::DirectoryNotFound { .. } | ValidationError::NoFilesFound { .. }
        )
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for ValidationError {
    fn from(err: ConfigError) -> Self {
        ValidationError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
