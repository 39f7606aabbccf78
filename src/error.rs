//! Error types for the typed (native) API
//!
//! The flat host surface never surfaces these; it logs and treats them as
//! a no-op.

use thiserror::Error;

/// Errors raised by buffer and dimension validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A width or height was zero.
    #[error("zero dimension: {what} is {width}x{height}")]
    ZeroDimension {
        /// Which buffer was described.
        what: &'static str,
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
    },

    /// The output pixel buffer does not match `ground_w * ground_h * 4`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBufferSize {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// The map texture is smaller than `map_w * map_h * 4`.
    #[error("map texture holds {actual} bytes, expected at least {expected}")]
    TextureSize {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// A byte buffer could not be viewed as RGBA8 texels.
    #[error("buffer of {0} bytes is not a whole number of RGBA8 pixels")]
    NotRgba(usize),

    /// A dimension does not fit the texel index type.
    #[error("dimension {0} exceeds the addressable range")]
    DimensionOverflow(usize),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
