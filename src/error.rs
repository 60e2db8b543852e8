//! Error types for the font preview library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the font preview library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document application could not be launched
    #[error("Could not connect to the document application: {0}")]
    Connect(String),

    /// The application failed to report its fonts
    #[error("Font enumeration failed: {0}")]
    FontEnumeration(String),

    /// A font could not be applied to a range
    #[error("Font '{name}' could not be applied: {reason}")]
    Font { name: String, reason: String },

    /// A document operation was rejected
    #[error("Document error: {0}")]
    Document(String),

    /// Saving the document failed
    #[error("Failed to save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    /// Operation on a handle that was already released
    #[error("The {0} is no longer open")]
    Closed(&'static str),

    /// Output exists and the overwrite policy refuses to replace it
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Invalid exclusion glob pattern
    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}
