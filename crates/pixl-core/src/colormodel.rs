//! Color models: how the channels of a [`crate::PixelBuffer`] are read.
//!
//! The model is a runtime tag carried by every buffer. Conversions between
//! models are always explicit operations; nothing in the crate widens a
//! grayscale buffer to RGB behind the caller's back.
//!
//! | model       | channels | layout          |
//! |-------------|----------|-----------------|
//! | `Grayscale` | 1        | `[Y]`           |
//! | `Rgb`       | 3        | `[R, G, B]`     |
//! | `Cmyk`      | 4        | `[C, M, Y, K]`  |
//!
//! RGBA never appears here: alpha is dropped during normalization
//! (see [`crate::source`]).

use std::fmt;

use crate::{Error, Result};

/// Channel interpretation of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// Single intensity channel.
    Grayscale,
    /// Red, green, blue.
    Rgb,
    /// Cyan, magenta, yellow, key (black).
    Cmyk,
}

impl ColorModel {
    /// Number of interleaved channels for this model.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    /// Resolves a channel count to the model that owns it.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedChannelCount`] for anything but 1, 3 or 4.
    pub fn from_channels(channels: usize, op: &'static str) -> Result<Self> {
        match channels {
            1 => Ok(Self::Grayscale),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Cmyk),
            n => Err(Error::unsupported_channels(
                u8::try_from(n).unwrap_or(u8::MAX),
                op,
            )),
        }
    }

    /// Short channel labels, in storage order.
    pub const fn channel_names(self) -> &'static [&'static str] {
        match self {
            Self::Grayscale => &["Y"],
            Self::Rgb => &["R", "G", "B"],
            Self::Cmyk => &["C", "M", "Y", "K"],
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale"),
            Self::Rgb => write!(f, "RGB"),
            Self::Cmyk => write!(f, "CMYK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        assert_eq!(ColorModel::Grayscale.channels(), 1);
        assert_eq!(ColorModel::Rgb.channels(), 3);
        assert_eq!(ColorModel::Cmyk.channels(), 4);
    }

    #[test]
    fn test_from_channels() {
        assert_eq!(ColorModel::from_channels(3, "t").unwrap(), ColorModel::Rgb);
        let err = ColorModel::from_channels(2, "t").unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedChannelCount { channels: 2, .. }
        ));
    }

    #[test]
    fn test_names_match_channels() {
        for model in [ColorModel::Grayscale, ColorModel::Rgb, ColorModel::Cmyk] {
            assert_eq!(model.channel_names().len(), model.channels());
        }
    }
}
