//! # Error Types
//!
//! Custom error types for agflight using `thiserror`.
//!
//! Malformed record bytes are never an error anywhere in this crate; the
//! decode pipeline degrades to an empty result instead. Errors exist only
//! at the edges: configuration, rule tables, and file handling.

use thiserror::Error;

/// Main error type for agflight
#[derive(Debug, Error)]
pub enum AgFlightError {
    /// Classification rule table errors
    #[error("Rule table error: {0}")]
    Rule(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for agflight
pub type Result<T> = std::result::Result<T, AgFlightError>;
