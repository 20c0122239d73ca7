//! Error types for profiler setup.
//!
//! Recording and querying never fail; misuse there is corrected and logged.
//! Only configuration and global initialization can return an error.

use thiserror::Error;

/// Profiler setup error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetreeError {
    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The process-wide registry was already created.
    #[error("Global registry already initialized")]
    AlreadyInitialized,

    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for environment variable {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, TimetreeError>;
