//! Error types for the mesh-gradient core.

use thiserror::Error;

/// Errors produced by mesh-gradient operations.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A construction parameter was out of range (point count, durations, radius range).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Surface width or height was zero, negative, or not finite.
    #[error("invalid dimensions: width and height must be positive")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Palette extraction from an image failed or timed out.
    #[error("palette extraction failed: {0}")]
    PaletteExtraction(String),

    /// The drawing surface could not be acquired (e.g. no 2D context).
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// An I/O error from snapshot writing or image loading.
    #[error("I/O error: {0}")]
    Io(String),
}
