//! Render error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Page {0} out of range")]
    PageOutOfRange(usize),
    #[error("Image error: {0}")]
    Image(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
