//! The canonical in-memory raster: [`PixelBuffer`].
//!
//! # Memory Layout
//!
//! Samples are 8-bit, interleaved, row-major, top-to-bottom:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! Channel meaning comes from the [`ColorModel`] tag.
//!
//! # Sharing
//!
//! Sample storage lives in an [`Arc<Vec<u8>>`]. Buffers are never mutated
//! after construction, so a clone is a refcount bump and one buffer can be
//! handed to any number of concurrent transforms. Every transform returns
//! a freshly allocated buffer.
//!
//! # Usage
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//!
//! let img = PixelBuffer::filled(4, 2, ColorModel::Rgb, &[255, 128, 0]).unwrap();
//! assert_eq!(img.dimensions(), (4, 2));
//! assert_eq!(img.pixel(3, 1), &[255, 128, 0]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::{ColorModel, Error, Rect, Result};

/// Immutable W x H x C raster of 8-bit samples.
#[derive(Clone)]
pub struct PixelBuffer {
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    model: ColorModel,
}

/// Checks `width * height * channels` for zero sizes and overflow.
fn checked_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}

/// Largest sample count an operation will allocate for its output.
pub const MAX_SAMPLES: usize = 1 << 28;

/// Largest width or height an operation will produce.
pub const MAX_DIMENSION: u32 = 1 << 18;

/// Sample count of a `width x height` buffer with `channels` channels,
/// checked before an operation allocates it.
///
/// # Errors
///
/// [`Error::InvalidDimensions`] for a zero dimension, a side longer than
/// [`MAX_DIMENSION`] or more than [`MAX_SAMPLES`] samples.
pub fn buffer_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    let len = checked_len(width, height, channels)?;
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::invalid_dimensions(
            width,
            height,
            format!("sides are limited to {MAX_DIMENSION} pixels"),
        ));
    }
    if len > MAX_SAMPLES {
        return Err(Error::invalid_dimensions(
            width,
            height,
            format!("{len} samples exceeds the limit of {MAX_SAMPLES}"),
        ));
    }
    Ok(len)
}

impl PixelBuffer {
    /// Wraps existing interleaved samples.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if either dimension is zero
    /// - [`Error::LengthMismatch`] if `data.len() != width * height * channels`
    pub fn from_data(width: u32, height: u32, model: ColorModel, data: Vec<u8>) -> Result<Self> {
        let expected = checked_len(width, height, model.channels())?;
        if data.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            model,
        })
    }

    /// Creates a buffer where every pixel equals `pixel`.
    ///
    /// # Errors
    ///
    /// As [`from_data`](Self::from_data); also [`Error::LengthMismatch`] if
    /// `pixel` does not have one value per channel.
    pub fn filled(width: u32, height: u32, model: ColorModel, pixel: &[u8]) -> Result<Self> {
        let n = model.channels();
        if pixel.len() != n {
            return Err(Error::LengthMismatch {
                expected: n,
                got: pixel.len(),
            });
        }
        let len = checked_len(width, height, n)?;
        let data = pixel.iter().copied().cycle().take(len).collect();
        Self::from_data(width, height, model, data)
    }

    /// Creates a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// `f` must return one value per channel; extra values are ignored and
    /// missing ones are zero.
    pub fn from_fn<F>(width: u32, height: u32, model: ColorModel, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let n = model.channels();
        let len = checked_len(width, height, n)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y)[..n]);
            }
        }
        Self::from_data(width, height, model, data)
    }

    /// Interleaves planar channels into one buffer.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the plane count or any plane length is
    /// wrong for `model` and the dimensions.
    pub fn from_planes(width: u32, height: u32, model: ColorModel, planes: &[&[u8]]) -> Result<Self> {
        let n = model.channels();
        if planes.len() != n {
            return Err(Error::LengthMismatch {
                expected: n,
                got: planes.len(),
            });
        }
        let count = checked_len(width, height, 1)?;
        if let Some(bad) = planes.iter().find(|p| p.len() != count) {
            return Err(Error::LengthMismatch {
                expected: count,
                got: bad.len(),
            });
        }
        let mut data = Vec::with_capacity(count * n);
        for i in 0..count {
            data.extend(planes.iter().map(|p| p[i]));
        }
        Self::from_data(width, height, model, data)
    }

    /// New buffer with this buffer's shape and model but different samples.
    pub fn with_data(&self, data: Vec<u8>) -> Result<Self> {
        Self::from_data(self.width, self.height, self.model, data)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel interpretation.
    #[inline]
    pub fn model(&self) -> ColorModel {
        self.model
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.model.channels()
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Rectangle covering the whole image.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// All samples, interleaved.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns its samples, copying only if shared.
    pub fn into_vec(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Samples of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let n = self.channels();
        let offset = (y as usize * self.width as usize + x as usize) * n;
        &self.data[offset..offset + n]
    }

    /// One row of interleaved samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row out of bounds");
        let len = self.width as usize * self.channels();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Copies channel `c` out into a planar vector.
    ///
    /// # Panics
    ///
    /// Panics if `c >= channels()`.
    pub fn plane(&self, c: usize) -> Vec<u8> {
        let n = self.channels();
        assert!(c < n, "channel index out of range");
        self.data.iter().skip(c).step_by(n).copied().collect()
    }

    /// Explicit widening to RGB.
    ///
    /// Grayscale is broadcast to three identical channels; RGB is returned
    /// as a cheap clone.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedChannelCount`] for CMYK input.
    pub fn to_rgb(&self) -> Result<Self> {
        match self.model {
            ColorModel::Rgb => Ok(self.clone()),
            ColorModel::Grayscale => {
                let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
                Self::from_data(self.width, self.height, ColorModel::Rgb, data)
            }
            ColorModel::Cmyk => Err(Error::unsupported_channels(4, "to_rgb")),
        }
    }

    /// `true` if both buffers share the same storage.
    #[inline]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.model == other.model
            && (self.shares_storage(other) || self.data == other.data)
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("model", &self.model)
            .field("samples", &self.data.len())
            .finish()
    }
}
