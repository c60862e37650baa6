//! Image resize and resampling operations.
//!
//! Separable two-pass resampling (horizontal, then vertical) with an `f32`
//! intermediate, rounded back to 8 bits at the end.
//!
//! # Filters
//!
//! - [`Resample::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Resample::Bilinear`] - Linear interpolation (smooth but blurry)
//! - [`Resample::Bicubic`] - Cubic interpolation (sharper than bilinear)
//! - [`Resample::Lanczos3`] - Sinc-based (best for downscaling)
//!
//! When downscaling, the kernel is stretched by the scale factor so every
//! source pixel contributes (area-averaging behaviour).
//!
//! # Example
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//! use pixl_ops::resize::{resize, Resample};
//!
//! let src = PixelBuffer::filled(16, 16, ColorModel::Rgb, &[40, 80, 120]).unwrap();
//! let dst = resize(&src, 32, 8, Resample::Lanczos3).unwrap();
//! assert_eq!(dst.dimensions(), (32, 8));
//! assert_eq!(dst.pixel(5, 5), &[40, 80, 120]);
//! ```

use pixl_core::{PixelBuffer, buffer_len};
use pixl_core::pixel::round_to_u8;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::OpsResult;
use crate::parallel::fill_rows;

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    #[default]
    Bilinear,
    /// Bicubic interpolation (Keys kernel, a = -0.5).
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    Lanczos3,
}

impl Resample {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Resample::Nearest => 0.5,
            Resample::Bilinear => 1.0,
            Resample::Bicubic => 2.0,
            Resample::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Resample::Nearest => nearest_weight(x),
            Resample::Bilinear => bilinear_weight(x),
            Resample::Bicubic => bicubic_weight(x),
            Resample::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

#[inline]
fn nearest_weight(x: f32) -> f32 {
    if x.abs() < 0.5 { 1.0 } else { 0.0 }
}

/// Triangle kernel.
#[inline]
fn bilinear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Keys cubic convolution kernel.
#[inline]
fn bicubic_weight(x: f32) -> f32 {
    const A: f32 = -0.5;

    let ax = x.abs();
    if ax < 1.0 {
        (A + 2.0) * ax * ax * ax - (A + 3.0) * ax * ax + 1.0
    } else if ax < 2.0 {
        A * ax * ax * ax - 5.0 * A * ax * ax + 8.0 * A * ax - 4.0 * A
    } else {
        0.0
    }
}

#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Normalized source taps for one destination coordinate.
#[derive(Debug)]
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

/// Precomputes the taps of every destination coordinate along one axis.
fn taps(src_len: usize, dst_len: usize, filter: Resample) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let stretch = scale.max(1.0);
    let support = filter.support() * stretch;

    (0..dst_len)
        .map(|i| {
            // Map destination center to source space
            let center = (i as f32 + 0.5) * scale - 0.5;
            let left = (center - support).floor().max(0.0) as usize;
            let right = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

            let mut weights: Vec<f32> = (left..=right)
                .map(|s| filter.weight((s as f32 - center) / stretch))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() <= f32::EPSILON {
                // Kernel fell between samples; take the nearest one.
                let nearest = (center.round().max(0.0) as usize).min(src_len - 1);
                return Taps {
                    start: nearest,
                    weights: vec![1.0],
                };
            }
            for w in &mut weights {
                *w /= sum;
            }
            Taps {
                start: left,
                weights,
            }
        })
        .collect()
}

/// Resizes a buffer to `width x height`, keeping its color model.
///
/// Resizing to the current size returns an exact copy.
///
/// # Errors
///
/// [`pixl_core::Error::InvalidDimensions`] if either target dimension is 0
/// or beyond the limits of [`pixl_core::buffer_len`].
pub fn resize(img: &PixelBuffer, width: u32, height: u32, filter: Resample) -> OpsResult<PixelBuffer> {
    let (sw, sh) = img.dimensions();
    debug!(src_w = sw, src_h = sh, dst_w = width, dst_h = height, ?filter, "resize");

    if (sw, sh) == (width, height) {
        trace!("resize to same size, copying");
        return Ok(img.with_data(img.data().to_vec())?);
    }

    let n = img.channels();
    buffer_len(width, height, n)?;
    // The horizontal pass holds dst width x src height
    buffer_len(width, sh, n)?;

    let (sw, sh) = (sw as usize, sh as usize);
    let (dw, dh) = (width as usize, height as usize);
    let xs = taps(sw, dw, filter);
    let ys = taps(sh, dh, filter);
    let src = img.data();

    // Horizontal pass: sh rows of dw pixels
    let mut tmp = vec![0.0f32; dw * sh * n];
    fill_rows(&mut tmp, dw * n, |y, row| {
        let line = &src[y * sw * n..(y + 1) * sw * n];
        for (x, tap) in xs.iter().enumerate() {
            let out = &mut row[x * n..(x + 1) * n];
            for (k, &w) in tap.weights.iter().enumerate() {
                let px = &line[(tap.start + k) * n..(tap.start + k + 1) * n];
                for (o, &v) in out.iter_mut().zip(px) {
                    *o += v as f32 * w;
                }
            }
        }
    });

    // Vertical pass: dh rows of dw pixels
    let mut dst = vec![0u8; dw * dh * n];
    let stride = dw * n;
    fill_rows(&mut dst, stride, |y, row| {
        let tap = &ys[y];
        let mut acc = vec![0.0f32; stride];
        for (k, &w) in tap.weights.iter().enumerate() {
            let sy = tap.start + k;
            let line = &tmp[sy * stride..(sy + 1) * stride];
            for (a, &v) in acc.iter_mut().zip(line) {
                *a += v * w;
            }
        }
        for (d, &a) in row.iter_mut().zip(&acc) {
            *d = round_to_u8(a);
        }
    });

    Ok(PixelBuffer::from_data(width, height, img.model(), dst)?)
}

/// Resizes `other` to the dimensions of `base` with bilinear resampling.
///
/// The color model of `other` is kept; callers that need matching models
/// convert explicitly first.
pub fn match_size(base: &PixelBuffer, other: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let (w, h) = base.dimensions();
    if other.dimensions() == (w, h) {
        trace!(w, h, "match_size: already matching");
        return Ok(other.clone());
    }
    resize(other, w, h, Resample::Bilinear)
}
