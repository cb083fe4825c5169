//! Error types for the skeleton pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring or analyzing a layout snapshot
#[derive(Error, Debug)]
pub enum Error {
    /// The offscreen surface could not be created or its document reached
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    /// Walking the snapshot tree failed
    #[error("Traversal failed: {0}")]
    Traversal(String),

    /// The rendering backend reported a failure
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A captured snapshot could not be decoded
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Snapshot(err.to_string())
    }
}
