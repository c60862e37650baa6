//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Structural problem with a buffer (shape, channel count, region).
    #[error(transparent)]
    Core(#[from] pixl_core::Error),

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the operation signature
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Unknown CMYK channel name.
    #[error("invalid channel tag {0:?}: expected one of c, m, y, k")]
    InvalidChannelTag(String),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`] error.
    #[inline]
    pub fn invalid_param(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Creates an [`OpsError::Core`] wrapping an unsupported channel count.
    #[inline]
    pub fn unsupported_channels(channels: usize, op: &'static str) -> Self {
        Self::Core(pixl_core::Error::unsupported_channels(
            u8::try_from(channels).unwrap_or(u8::MAX),
            op,
        ))
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Rejects NaN and infinities.
pub(crate) fn ensure_finite(name: &'static str, v: f64) -> OpsResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(OpsError::invalid_param(name, format!("must be finite, got {v}")))
    }
}
