//! Error types for document loading and validation.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading or validating a document.
///
/// These never escape the [`Player`](crate::Player): a failed load is
/// reported through [`LoadingStatus::Error`](crate::LoadingStatus::Error).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Document bytes could not be deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document parsed but references something that does not exist.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Reading the document source failed.
    #[error("Failed to read document source: {0}")]
    Io(#[from] std::io::Error),

    /// An embedded asset payload could not be decoded.
    #[error("Failed to decode asset: {0}")]
    AssetDecode(String),
}
