//! Normalization of heterogeneous inputs into a [`PixelBuffer`].
//!
//! Callers hand pixels to the library in one of two shapes, modelled as the
//! tagged union [`ImageSource`]:
//!
//! - [`RawSamples`] - a bare interleaved sample slice with known geometry
//! - [`DecodedImage`] - a descriptor produced by an external codec
//!
//! [`normalize`] handles both exhaustively:
//!
//! | input channels | result                                   |
//! |----------------|------------------------------------------|
//! | 1 (gray)       | `Grayscale`                              |
//! | 2 (gray+alpha) | `Grayscale`, alpha dropped               |
//! | 3 (RGB)        | `Rgb`                                    |
//! | 4 (RGBA)       | `Rgb`, alpha dropped                     |
//!
//! Alpha is discarded, not composited against a background. This is a
//! deliberate simplification: semi-transparent edges keep their straight
//! color rather than being premultiplied.
//!
//! Non-`u8` samples are clamped to `[0, 255]` and truncated, never
//! rescaled (see [`Sample`]).
//!
//! ```rust
//! use pixl_core::{normalize, ColorModel, ImageSource, RawSamples, SampleSlice};
//!
//! let rgba = [10.7f32, 300.0, -5.0, 128.0];
//! let img = normalize(ImageSource::Raw(RawSamples {
//!     width: 1,
//!     height: 1,
//!     channels: 4,
//!     samples: SampleSlice::F32(&rgba),
//! }))
//! .unwrap();
//! assert_eq!(img.model(), ColorModel::Rgb);
//! assert_eq!(img.data(), &[10, 255, 0]);
//! ```

use tracing::{debug, trace};

use crate::pixel::Sample;
use crate::{ColorModel, Error, PixelBuffer, Result};

/// Borrowed interleaved samples of some numeric type.
#[derive(Debug, Clone, Copy)]
pub enum SampleSlice<'a> {
    /// 8-bit unsigned
    U8(&'a [u8]),
    /// 16-bit unsigned
    U16(&'a [u16]),
    /// 32-bit signed
    I32(&'a [i32]),
    /// 32-bit float
    F32(&'a [f32]),
    /// 64-bit float
    F64(&'a [f64]),
}

impl SampleSlice<'_> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(s) => s.len(),
            Self::U16(s) => s.len(),
            Self::I32(s) => s.len(),
            Self::F32(s) => s.len(),
            Self::F64(s) => s.len(),
        }
    }

    /// `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::U8(_) => u8::NAME,
            Self::U16(_) => u16::NAME,
            Self::I32(_) => i32::NAME,
            Self::F32(_) => f32::NAME,
            Self::F64(_) => f64::NAME,
        }
    }

    /// Keeps the first `keep` of every `stride` samples, clamped to 8 bits.
    fn to_u8(self, stride: usize, keep: usize) -> Vec<u8> {
        fn pick<T: Sample>(src: &[T], stride: usize, keep: usize) -> Vec<u8> {
            if stride == keep {
                return src.iter().map(|v| v.to_u8_clamped()).collect();
            }
            src.chunks_exact(stride)
                .flat_map(|px| px[..keep].iter().map(|v| v.to_u8_clamped()))
                .collect()
        }
        match self {
            Self::U8(s) => pick(s, stride, keep),
            Self::U16(s) => pick(s, stride, keep),
            Self::I32(s) => pick(s, stride, keep),
            Self::F32(s) => pick(s, stride, keep),
            Self::F64(s) => pick(s, stride, keep),
        }
    }
}

/// A raw interleaved buffer with caller-supplied geometry.
#[derive(Debug, Clone, Copy)]
pub struct RawSamples<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Interleaved channels per pixel (1, 2, 3 or 4)
    pub channels: usize,
    /// The samples, `width * height * channels` of them
    pub samples: SampleSlice<'a>,
}

/// Channel layout reported by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedLayout {
    /// Gray
    Luma,
    /// Gray + alpha
    LumaAlpha,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
}

impl DecodedLayout {
    /// Interleaved channels per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::LumaAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// An image decoded by an external codec.
///
/// The codec service implements this for its own image type; the library
/// only reads through it.
pub trait DecodedImage {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Channel layout of [`samples`](Self::samples).
    fn layout(&self) -> DecodedLayout;
    /// Interleaved, row-major samples.
    fn samples(&self) -> SampleSlice<'_>;
}

/// Every accepted input shape.
#[derive(Clone, Copy)]
pub enum ImageSource<'a> {
    /// Bare samples with known geometry.
    Raw(RawSamples<'a>),
    /// Codec-produced descriptor.
    Decoded(&'a dyn DecodedImage),
}

impl<'a> From<RawSamples<'a>> for ImageSource<'a> {
    fn from(raw: RawSamples<'a>) -> Self {
        Self::Raw(raw)
    }
}

/// Converts any [`ImageSource`] into a canonical [`PixelBuffer`].
///
/// # Errors
///
/// - [`Error::UnsupportedChannelCount`] for a raw channel count outside 1..=4
/// - [`Error::InvalidDimensions`] for zero width or height
/// - [`Error::LengthMismatch`] if the sample count disagrees with the geometry
pub fn normalize(source: ImageSource<'_>) -> Result<PixelBuffer> {
    let raw = match source {
        ImageSource::Raw(raw) => raw,
        ImageSource::Decoded(img) => RawSamples {
            width: img.width(),
            height: img.height(),
            channels: img.layout().channels(),
            samples: img.samples(),
        },
    };

    // Alpha, if any, is the trailing channel
    let keep = match raw.channels {
        2 => 1,
        4 => 3,
        n => n,
    };
    let model = ColorModel::from_channels(keep, "normalize")?;

    debug!(
        width = raw.width,
        height = raw.height,
        channels = raw.channels,
        sample_type = raw.samples.type_name(),
        "normalize"
    );

    let expected = (raw.width as usize)
        .checked_mul(raw.height as usize)
        .and_then(|v| v.checked_mul(raw.channels))
        .ok_or_else(|| Error::invalid_dimensions(raw.width, raw.height, "buffer size overflows"))?;
    if raw.width == 0 || raw.height == 0 {
        return Err(Error::invalid_dimensions(
            raw.width,
            raw.height,
            "width and height must be > 0",
        ));
    }
    if raw.samples.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            got: raw.samples.len(),
        });
    }

    if keep != raw.channels {
        trace!(from = raw.channels, to = keep, "dropping alpha channel");
    }
    let data = raw.samples.to_u8(raw.channels, keep);
    PixelBuffer::from_data(raw.width, raw.height, model, data)
}
