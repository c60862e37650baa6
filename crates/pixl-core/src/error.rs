//! Error types for pixl-core.
//!
//! Only structurally invalid input surfaces as an error here. Out-of-range
//! coordinates and intensities are clamped by the types that receive them
//! (see [`crate::rect::Rect::clamped`] and [`crate::pixel::quantize`]).
//!
//! # Usage
//!
//! ```rust
//! use pixl_core::{ColorModel, Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_data(2, 2, ColorModel::Rgb, vec![0; 5]).unwrap_err();
//! assert!(matches!(err, Error::LengthMismatch { expected: 12, got: 5 }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or normalizing pixel buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Width or height is zero, or the buffer size overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Sample count does not match `width * height * channels`.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Expected sample count
        expected: usize,
        /// Actual sample count
        got: usize,
    },

    /// An operation received a channel count it cannot interpret.
    ///
    /// Operations that need RGB accept grayscale (after an explicit
    /// broadcast) and RGB; anything else ends up here.
    #[error("unsupported channel count {channels} for {op}")]
    UnsupportedChannelCount {
        /// Channel count that was received
        channels: u8,
        /// Operation that rejected it
        op: &'static str,
    },

    /// A region degenerates to zero area.
    ///
    /// [`crate::rect::Rect::clamped`] always yields at least 1x1, so this is
    /// only reachable through [`crate::rect::Rect::new`].
    #[error("invalid region ({x1}, {y1})-({x2}, {y2})")]
    InvalidRegion {
        /// Left edge (inclusive)
        x1: u32,
        /// Top edge (inclusive)
        y1: u32,
        /// Right edge (exclusive)
        x2: u32,
        /// Bottom edge (exclusive)
        y2: u32,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedChannelCount`] error.
    #[inline]
    pub fn unsupported_channels(channels: u8, op: &'static str) -> Self {
        Self::UnsupportedChannelCount { channels, op }
    }

    /// Returns `true` if this error comes from a bad buffer shape.
    #[inline]
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::LengthMismatch { .. }
        )
    }
}
