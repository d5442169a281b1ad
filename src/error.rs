//! Error types for the page-curl library.

use thiserror::Error;

/// Result type alias using BookError.
pub type Result<T> = std::result::Result<T, BookError>;

/// Main error type for book construction, texture generation and export.
///
/// Runtime navigation and per-frame updates never fail; out-of-range page
/// requests are clamped instead.
#[derive(Error, Debug)]
pub enum BookError {
    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to encode or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Book content violates its structural invariants.
    #[error("Invalid book: {0}")]
    InvalidBook(String),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to rasterize a page face.
    #[error("Texture error: {0}")]
    Texture(String),

    /// Failed to export a mesh.
    #[error("Export error: {0}")]
    Export(String),
}
