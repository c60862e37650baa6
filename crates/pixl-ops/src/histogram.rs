//! Histograms and CDF-based equalization.
//!
//! # Equalization
//!
//! For a channel with histogram `h`, let `cdf` be its running sum,
//! `min` the smallest non-zero `cdf` entry and `max = cdf[255]`. Every
//! level `v` that occurs maps to
//!
//! ```text
//! (cdf[v] - min) * 255 / (max - min)      (integer floor)
//! ```
//!
//! Levels below the first occupied one map to 0. When the channel holds a
//! single value `max == min` and the whole channel maps to 0; this is a
//! documented outcome, reported with a `warn!` event rather than an error.
//!
//! The arithmetic is done on integers, so a channel whose histogram is
//! already flat over `[0, 255]` maps exactly onto itself.

use pixl_core::pixel::{luma_u8, quantize};
use pixl_core::{ColorModel, PixelBuffer};
use tracing::{debug, trace, warn};

use crate::color::rgb_operand;
use crate::parallel::{map_channel_luts, map_lut, map_pixels};
use crate::{OpsError, OpsResult};

/// Number of bins, one per 8-bit level.
pub const BINS: usize = 256;

/// Offset added to the equalized luma before computing a pixel's gain.
pub const LUMA_GAIN_EPSILON: f64 = 1e-6;

/// 256-bin count of 8-bit sample values.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
}

impl Histogram {
    /// Counts the values of a sample slice.
    pub fn from_samples(samples: &[u8]) -> Self {
        Self::from_iter(samples.iter().copied())
    }

    /// Histogram of channel `c` of an interleaved buffer.
    ///
    /// # Panics
    ///
    /// Panics if `c >= img.channels()`.
    pub fn of_channel(img: &PixelBuffer, c: usize) -> Self {
        let n = img.channels();
        assert!(c < n, "channel index out of range");
        Self::from_iter(img.data().iter().skip(c).step_by(n).copied())
    }

    /// Per-level counts.
    #[inline]
    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    /// Count of one level.
    #[inline]
    pub fn count(&self, level: u8) -> u64 {
        self.bins[level as usize]
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Running sum of the bins.
    pub fn cumulative(&self) -> [u64; BINS] {
        let mut cdf = [0u64; BINS];
        let mut acc = 0u64;
        for (out, &count) in cdf.iter_mut().zip(&self.bins) {
            acc += count;
            *out = acc;
        }
        cdf
    }

    /// Lowest and highest occupied levels, `None` if empty.
    pub fn range(&self) -> Option<(u8, u8)> {
        let lo = self.bins.iter().position(|&c| c > 0)?;
        let hi = self.bins.iter().rposition(|&c| c > 0)?;
        Some((lo as u8, hi as u8))
    }

    /// Equalization table for this histogram.
    pub fn cdf_mapping(&self) -> CdfMapping {
        CdfMapping::from_histogram(self)
    }
}

impl FromIterator<u8> for Histogram {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut bins = [0u64; BINS];
        for v in iter {
            bins[v as usize] += 1;
        }
        Self { bins }
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("total", &self.total())
            .field("range", &self.range())
            .finish()
    }
}

/// Builds the histogram of a channel's samples.
pub fn histogram(samples: &[u8]) -> Histogram {
    Histogram::from_samples(samples)
}

/// Monotone lookup table from input level to equalized level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdfMapping {
    lut: [u8; BINS],
    degenerate: bool,
}

impl CdfMapping {
    /// Derives the table from a histogram (see the module docs).
    pub fn from_histogram(hist: &Histogram) -> Self {
        let cdf = hist.cumulative();
        let max = cdf[BINS - 1];
        let Some(min) = cdf.iter().copied().find(|&v| v > 0) else {
            return Self {
                lut: [0; BINS],
                degenerate: true,
            };
        };

        let span = (max - min) as u128;
        let mut lut = [0u8; BINS];
        if span > 0 {
            for (out, &c) in lut.iter_mut().zip(&cdf) {
                if c > 0 {
                    let scaled = (c - min) as u128 * 255 / span;
                    *out = scaled.min(255) as u8;
                }
            }
        }
        trace!(min, max, "cdf mapping");
        Self {
            lut,
            degenerate: span == 0,
        }
    }

    /// The table itself.
    #[inline]
    pub fn lut(&self) -> &[u8; BINS] {
        &self.lut
    }

    /// Equalized value of one level.
    #[inline]
    pub fn map(&self, level: u8) -> u8 {
        self.lut[level as usize]
    }

    /// `true` if the source had at most one distinct level.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Mapping for `samples`, warning when it collapses to zero.
fn channel_mapping(samples: impl Iterator<Item = u8>, label: &str) -> CdfMapping {
    let mapping = Histogram::from_iter(samples).cdf_mapping();
    if mapping.is_degenerate() {
        warn!(channel = label, "constant channel equalizes to all zeros");
    }
    mapping
}

/// Equalizes one channel's samples.
///
/// # Example
///
/// ```rust
/// use pixl_ops::histogram::equalize_channel;
///
/// assert_eq!(equalize_channel(&[10, 10, 20, 30]), vec![0, 0, 127, 255]);
/// // A constant channel collapses to zero
/// assert_eq!(equalize_channel(&[42, 42]), vec![0, 0]);
/// ```
pub fn equalize_channel(samples: &[u8]) -> Vec<u8> {
    let mapping = channel_mapping(samples.iter().copied(), "samples");
    map_lut(samples, mapping.lut())
}

/// Equalizes every channel independently.
///
/// Grayscale and RGB keep their model.
///
/// # Errors
///
/// `UnsupportedChannelCount` for CMYK input.
pub fn equalize_per_channel(img: &PixelBuffer) -> OpsResult<PixelBuffer> {
    debug!(w = img.width(), h = img.height(), model = %img.model(), "equalize_per_channel");
    if img.model() == ColorModel::Cmyk {
        return Err(OpsError::unsupported_channels(4, "equalize_per_channel"));
    }
    let n = img.channels();
    let names = img.model().channel_names();
    let luts: Vec<[u8; BINS]> = (0..n)
        .map(|c| {
            let samples = img.data().iter().skip(c).step_by(n).copied();
            *channel_mapping(samples, names[c]).lut()
        })
        .collect();
    Ok(img.with_data(map_channel_luts(img.data(), &luts))?)
}

/// Equalizes BT.709 luma and scales each RGB pixel by the luma gain.
///
/// The gain of a pixel with luma `l` (truncated to 8 bits) is
/// `(eq(l) + 1e-6) / max(l, 1)`. Scaling all three channels by the same
/// factor keeps hue closer to the original than [`equalize_per_channel`].
/// Grayscale input is broadcast to RGB first; the result is RGB.
///
/// # Errors
///
/// `UnsupportedChannelCount` for CMYK input.
pub fn equalize_luminance(img: &PixelBuffer) -> OpsResult<PixelBuffer> {
    debug!(w = img.width(), h = img.height(), "equalize_luminance");
    let rgb = rgb_operand(img, "equalize_luminance")?;
    let luma = map_pixels(rgb.data(), 3, 1, |s, d| d[0] = luma_u8([s[0], s[1], s[2]]));
    let mapping = channel_mapping(luma.iter().copied(), "luma");

    // Gain depends only on the source luma level
    let mut gains = [0f64; BINS];
    for (l, gain) in gains.iter_mut().enumerate() {
        *gain = (mapping.map(l as u8) as f64 + LUMA_GAIN_EPSILON) / (l as f64).max(1.0);
    }

    let data = map_pixels(rgb.data(), 3, 3, |s, d| {
        let gain = gains[luma_u8([s[0], s[1], s[2]]) as usize];
        for c in 0..3 {
            d[c] = quantize(s[c] as f64 * gain);
        }
    });
    Ok(rgb.with_data(data)?)
}

/// Histograms of an image's channels and its luma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelHistograms {
    /// Single gray channel.
    Gray(Histogram),
    /// R, G, B plus the BT.709 luma of each pixel.
    Rgb {
        /// Red
        red: Histogram,
        /// Green
        green: Histogram,
        /// Blue
        blue: Histogram,
        /// Luma
        luma: Histogram,
    },
}

impl ChannelHistograms {
    /// Computes every histogram of `img` in one call.
    ///
    /// # Errors
    ///
    /// `UnsupportedChannelCount` for CMYK input.
    pub fn compute(img: &PixelBuffer) -> OpsResult<Self> {
        debug!(model = %img.model(), pixels = img.pixel_count(), "channel histograms");
        match img.model() {
            ColorModel::Grayscale => Ok(Self::Gray(Histogram::from_samples(img.data()))),
            ColorModel::Rgb => Ok(Self::Rgb {
                red: Histogram::of_channel(img, 0),
                green: Histogram::of_channel(img, 1),
                blue: Histogram::of_channel(img, 2),
                luma: img
                    .data()
                    .chunks_exact(3)
                    .map(|p| luma_u8([p[0], p[1], p[2]]))
                    .collect(),
            }),
            ColorModel::Cmyk => Err(OpsError::unsupported_channels(4, "channel_histograms")),
        }
    }

    /// `(label, histogram)` pairs in display order.
    pub fn labeled(&self) -> Vec<(&'static str, &Histogram)> {
        match self {
            Self::Gray(h) => vec![("gray", h)],
            Self::Rgb {
                red,
                green,
                blue,
                luma,
            } => vec![("red", red), ("green", green), ("blue", blue), ("luma", luma)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let h = histogram(&[0, 0, 5, 255]);
        assert_eq!(h.count(0), 2);
        assert_eq!(h.count(5), 1);
        assert_eq!(h.count(255), 1);
        assert_eq!(h.total(), 4);
        assert_eq!(h.range(), Some((0, 255)));
        assert_eq!(histogram(&[]).range(), None);
    }

    #[test]
    fn test_cumulative_is_monotone() {
        let h = histogram(&[3, 3, 7, 200]);
        let cdf = h.cumulative();
        assert_eq!(cdf[2], 0);
        assert_eq!(cdf[3], 2);
        assert_eq!(cdf[255], 4);
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_mapping_monotone_and_bounded() {
        let samples: Vec<u8> = (0..1000u32).map(|i| ((i * i) % 97) as u8 + 40).collect();
        let m = histogram(&samples).cdf_mapping();
        assert!(m.lut().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(m.map(255), 255);
        assert!(!m.is_degenerate());
    }

    #[test]
    fn test_equalize_uniform_is_identity() {
        let samples: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v]).collect();
        assert_eq!(equalize_channel(&samples), samples);
    }

    #[test]
    fn test_equalize_stretches_narrow_range() {
        let out = equalize_channel(&[100, 101, 102, 103]);
        assert_eq!(out, vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_equalize_constant_is_zero() {
        let m = histogram(&[9; 16]).cdf_mapping();
        assert!(m.is_degenerate());
        assert_eq!(equalize_channel(&[9; 16]), vec![0; 16]);
        assert!(equalize_channel(&[]).is_empty());
    }

    #[test]
    fn test_equalize_per_channel() {
        let img = PixelBuffer::from_data(
            2,
            1,
            ColorModel::Rgb,
            vec![10, 50, 7, 20, 50, 8],
        )
        .unwrap();
        let out = equalize_per_channel(&img).unwrap();
        // R and B stretch, G is constant
        assert_eq!(out.data(), &[0, 0, 0, 255, 0, 255]);

        let gray = PixelBuffer::from_data(2, 1, ColorModel::Grayscale, vec![1, 2]).unwrap();
        let out = equalize_per_channel(&gray).unwrap();
        assert_eq!(out.model(), ColorModel::Grayscale);
        assert_eq!(out.data(), &[0, 255]);
    }

    #[test]
    fn test_equalize_luminance_scales_pixels() {
        // Two gray levels: luma 50 -> 0 and luma 100 -> 255
        let img = PixelBuffer::from_data(
            2,
            1,
            ColorModel::Rgb,
            vec![50, 50, 50, 100, 100, 100],
        )
        .unwrap();
        let out = equalize_luminance(&img).unwrap();
        assert_eq!(out.pixel(0, 0), &[0, 0, 0]);
        assert_eq!(out.pixel(1, 0), &[255, 255, 255]);
    }

    #[test]
    fn test_equalize_rejects_cmyk() {
        let cmyk = PixelBuffer::filled(1, 1, ColorModel::Cmyk, &[0; 4]).unwrap();
        assert!(equalize_per_channel(&cmyk).is_err());
        assert!(equalize_luminance(&cmyk).is_err());
        assert!(ChannelHistograms::compute(&cmyk).is_err());
    }

    #[test]
    fn test_channel_histograms() {
        let img = PixelBuffer::filled(2, 2, ColorModel::Rgb, &[255, 0, 0]).unwrap();
        let hists = ChannelHistograms::compute(&img).unwrap();
        let labeled = hists.labeled();
        assert_eq!(labeled.len(), 4);
        assert_eq!(labeled[0].1.count(255), 4);
        assert_eq!(labeled[1].1.count(0), 4);
        assert_eq!(labeled[3].1.count(54), 4);

        let gray = PixelBuffer::filled(3, 1, ColorModel::Grayscale, &[7]).unwrap();
        let hists = ChannelHistograms::compute(&gray).unwrap();
        assert_eq!(hists.labeled()[0].0, "gray");
    }
}
