//! Color model conversions and channel isolation.
//!
//! Conversions are always explicit: an operation that needs RGB widens a
//! grayscale buffer through [`PixelBuffer::to_rgb`] and rejects CMYK with
//! `UnsupportedChannelCount`.
//!
//! # CMYK
//!
//! Naive device-independent conversion on normalized channels:
//!
//! ```text
//! K = 1 - max(R, G, B)
//! C = (1 - R - K) / (1 - K + eps)      (same for M, Y)
//! ```
//!
//! The epsilon makes pure black come out as `C = M = Y = 0, K = 1` without
//! a special case. The reverse direction used by [`suppress_cmyk_channel`]
//! is `R = 1 - min(1, C + K)`.

use std::fmt;
use std::str::FromStr;

use pixl_core::pixel::{average_u8, luma_u8, quantize};
use pixl_core::{ColorModel, PixelBuffer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parallel::{map_lut, map_pixels};
use crate::{OpsError, OpsResult};

/// Guard added to the CMYK denominator.
pub const CMYK_EPSILON: f64 = 1e-12;

/// Widens grayscale to RGB, passes RGB through, rejects CMYK.
pub(crate) fn rgb_operand(img: &PixelBuffer, op: &'static str) -> OpsResult<PixelBuffer> {
    match img.model() {
        ColorModel::Cmyk => Err(OpsError::unsupported_channels(4, op)),
        _ => Ok(img.to_rgb()?),
    }
}

/// RGB to gray reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayMethod {
    /// BT.709 weights: `0.2126 R + 0.7152 G + 0.0722 B`.
    #[default]
    Luma,
    /// `(R + G + B) / 3`.
    Average,
}

/// Converts to a single-channel image.
///
/// Grayscale input is returned unchanged.
///
/// # Errors
///
/// `UnsupportedChannelCount` for CMYK input.
pub fn to_grayscale(img: &PixelBuffer, method: GrayMethod) -> OpsResult<PixelBuffer> {
    debug!(?method, model = %img.model(), "to_grayscale");
    match img.model() {
        ColorModel::Grayscale => Ok(img.clone()),
        ColorModel::Cmyk => Err(OpsError::unsupported_channels(4, "to_grayscale")),
        ColorModel::Rgb => {
            let reduce: fn([u8; 3]) -> u8 = match method {
                GrayMethod::Luma => luma_u8,
                GrayMethod::Average => average_u8,
            };
            let data = map_pixels(img.data(), 3, 1, |s, d| d[0] = reduce([s[0], s[1], s[2]]));
            Ok(PixelBuffer::from_data(
                img.width(),
                img.height(),
                ColorModel::Grayscale,
                data,
            )?)
        }
    }
}

/// Photographic negative: `255 - sample` on every channel.
///
/// # Example
///
/// ```rust
/// use pixl_core::{ColorModel, PixelBuffer};
/// use pixl_ops::color::invert;
///
/// let img = PixelBuffer::from_data(1, 1, ColorModel::Rgb, vec![0, 100, 255]).unwrap();
/// assert_eq!(invert(&img).unwrap().data(), &[255, 155, 0]);
/// ```
pub fn invert(img: &PixelBuffer) -> OpsResult<PixelBuffer> {
    debug!(model = %img.model(), "invert");
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = 255 - i as u8;
    }
    Ok(img.with_data(map_lut(img.data(), &lut))?)
}

/// Luma grayscale, then `>= threshold` becomes 255 and the rest 0.
pub fn binarize(img: &PixelBuffer, threshold: u8) -> OpsResult<PixelBuffer> {
    debug!(threshold, "binarize");
    let gray = to_grayscale(img, GrayMethod::Luma)?;
    let mut lut = [0u8; 256];
    for v in lut.iter_mut().skip(threshold as usize) {
        *v = 255;
    }
    Ok(gray.with_data(map_lut(gray.data(), &lut))?)
}

/// Converts one RGB pixel to quantized CMYK.
#[inline]
fn cmyk_pixel(rgb: &[u8]) -> [u8; 4] {
    let [r, g, b] = [rgb[0], rgb[1], rgb[2]].map(|v| v as f64 / 255.0);
    let k = 1.0 - r.max(g).max(b);
    let denom = 1.0 - k + CMYK_EPSILON;
    let [c, m, y] = [r, g, b].map(|x| (1.0 - x - k) / denom);
    [c, m, y, k].map(|v| quantize(v * 255.0))
}

/// Converts to 4-channel CMYK.
///
/// Grayscale input is broadcast to RGB first.
///
/// # Example
///
/// ```rust
/// use pixl_core::{ColorModel, PixelBuffer};
/// use pixl_ops::color::rgb_to_cmyk;
///
/// let img = PixelBuffer::from_data(2, 1, ColorModel::Rgb, vec![255, 255, 255, 0, 0, 0]).unwrap();
/// let cmyk = rgb_to_cmyk(&img).unwrap();
/// assert_eq!(cmyk.data(), &[0, 0, 0, 0, 0, 0, 0, 255]);
/// ```
pub fn rgb_to_cmyk(img: &PixelBuffer) -> OpsResult<PixelBuffer> {
    debug!(model = %img.model(), "rgb_to_cmyk");
    let rgb = rgb_operand(img, "rgb_to_cmyk")?;
    let data = map_pixels(rgb.data(), 3, 4, |s, d| d.copy_from_slice(&cmyk_pixel(s)));
    Ok(PixelBuffer::from_data(
        rgb.width(),
        rgb.height(),
        ColorModel::Cmyk,
        data,
    )?)
}

/// Keeps channel `index` and zeroes every other channel.
///
/// Valid for RGB (`0..3`) and CMYK (`0..4`); grayscale is broadcast to RGB
/// first. The color model and dimensions are preserved.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `index` is out of range for the model.
pub fn extract_channel(img: &PixelBuffer, index: usize) -> OpsResult<PixelBuffer> {
    debug!(index, model = %img.model(), "extract_channel");
    let src = match img.model() {
        ColorModel::Grayscale => img.to_rgb()?,
        _ => img.clone(),
    };
    let n = src.channels();
    if index >= n {
        return Err(OpsError::invalid_param(
            "index",
            format!("{} has {n} channels, got index {index}", src.model()),
        ));
    }
    let data = map_pixels(src.data(), n, n, |s, d| d[index] = s[index]);
    Ok(src.with_data(data)?)
}

/// Splits an RGB image into three single-channel layers.
///
/// Each layer is still RGB; only its own channel is non-zero.
pub fn extract_rgb_layers(img: &PixelBuffer) -> OpsResult<[PixelBuffer; 3]> {
    let rgb = rgb_operand(img, "extract_rgb_layers")?;
    Ok([
        extract_channel(&rgb, 0)?,
        extract_channel(&rgb, 1)?,
        extract_channel(&rgb, 2)?,
    ])
}

/// Converts to CMYK (unless already CMYK) and splits into four layers.
pub fn extract_cmyk_layers(img: &PixelBuffer) -> OpsResult<[PixelBuffer; 4]> {
    let cmyk = match img.model() {
        ColorModel::Cmyk => img.clone(),
        _ => rgb_to_cmyk(img)?,
    };
    Ok([
        extract_channel(&cmyk, 0)?,
        extract_channel(&cmyk, 1)?,
        extract_channel(&cmyk, 2)?,
        extract_channel(&cmyk, 3)?,
    ])
}

/// One of the four CMYK channels.
///
/// Parses from `c`, `m`, `y`, `k` or the full channel names, ignoring
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CmykChannel {
    /// Cyan
    Cyan,
    /// Magenta
    Magenta,
    /// Yellow
    Yellow,
    /// Key (black)
    Key,
}

impl CmykChannel {
    /// Position of the channel in a CMYK pixel.
    pub const fn index(self) -> usize {
        match self {
            Self::Cyan => 0,
            Self::Magenta => 1,
            Self::Yellow => 2,
            Self::Key => 3,
        }
    }

    /// Single-letter tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Cyan => "c",
            Self::Magenta => "m",
            Self::Yellow => "y",
            Self::Key => "k",
        }
    }
}

impl FromStr for CmykChannel {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cyan" => Ok(Self::Cyan),
            "m" | "magenta" => Ok(Self::Magenta),
            "y" | "yellow" => Ok(Self::Yellow),
            "k" | "key" | "black" => Ok(Self::Key),
            _ => Err(OpsError::InvalidChannelTag(s.to_string())),
        }
    }
}

impl TryFrom<String> for CmykChannel {
    type Error = OpsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CmykChannel> for String {
    fn from(ch: CmykChannel) -> Self {
        ch.tag().to_string()
    }
}

impl fmt::Display for CmykChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Zeroes one CMYK channel and reconstructs an approximate RGB image.
///
/// RGB and grayscale input are converted with [`rgb_to_cmyk`]; CMYK input
/// is used as is. The result is always RGB.
pub fn suppress_cmyk_channel(img: &PixelBuffer, channel: CmykChannel) -> OpsResult<PixelBuffer> {
    debug!(%channel, model = %img.model(), "suppress_cmyk_channel");
    let cmyk = match img.model() {
        ColorModel::Cmyk => img.clone(),
        _ => rgb_to_cmyk(img)?,
    };
    let drop = channel.index();
    let data = map_pixels(cmyk.data(), 4, 3, |s, d| {
        let mut px = [s[0], s[1], s[2], s[3]].map(|v| v as f64 / 255.0);
        px[drop] = 0.0;
        let k = px[3];
        for c in 0..3 {
            d[c] = quantize((1.0 - (px[c] + k).min(1.0)) * 255.0);
        }
    });
    Ok(PixelBuffer::from_data(
        cmyk.width(),
        cmyk.height(),
        ColorModel::Rgb,
        data,
    )?)
}
