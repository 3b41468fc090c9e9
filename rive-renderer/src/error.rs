//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while building or drawing render resources.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Path tessellation failed.
    #[error("Tessellation failed: {0}")]
    Tessellation(String),

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Font bytes could not be registered.
    #[error("Failed to load font: {0}")]
    FontDecode(String),

    /// A render target could not be created or encoded.
    #[error("Surface error: {0}")]
    Surface(String),
}
