use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Sentinel routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Route search never fails: "no route", "unknown port", and infeasible
/// constraints are all reported as empty results. Errors only arise while
/// loading reference data, resolving configuration, or fetching live
/// augmentation rows.
#[derive(Debug, Error)]
pub enum Error {
    /// Reference or risk data file could not be located.
    #[error("reference data not found at {path}")]
    ReferenceDataNotFound { path: PathBuf },

    /// Reference or risk data file was readable but could not be parsed.
    #[error("failed to parse {kind} data from {source_name}: {message}")]
    ReferenceDataParse {
        kind: &'static str,
        source_name: String,
        message: String,
    },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for configuration files")]
    ProjectDirsUnavailable,

    /// Raised when a configuration value from the environment is malformed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfigValue { key: &'static str, value: String },

    /// Raised when the augmentation endpoint answered with a non-success status.
    #[error("augmentation source {url} responded with status {status}")]
    AugmentationStatus { url: String, status: u16 },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
