//! Geometric transformation operations.
//!
//! # Operations
//!
//! - [`crop`] - Extract a clamped region as an independent copy
//! - [`zoom_area`] / [`zoom_area_with`] - Crop then rescale
//! - [`rotate`] - Rotate about the center, optionally growing the canvas
//!
//! Coordinates are never rejected: out-of-range values are clamped into
//! the image (see [`Rect::clamped`]) and the result is at least 1x1.
//!
//! # Example
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//! use pixl_ops::transform::{crop, rotate, Fill};
//!
//! let src = PixelBuffer::filled(100, 50, ColorModel::Rgb, &[9, 9, 9]).unwrap();
//!
//! let cropped = crop(&src, 10, 10, 30, 20).unwrap();
//! assert_eq!(cropped.dimensions(), (20, 10));
//!
//! let turned = rotate(&src, 90.0, true, Fill::default()).unwrap();
//! assert_eq!(turned.dimensions(), (50, 100));
//! ```

use pixl_core::pixel::{luma_u8, round_to_u8};
use pixl_core::{ColorModel, PixelBuffer, Rect, buffer_len};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ensure_finite;
use crate::parallel::fill_rows;
use crate::resize::{Resample, resize};
use crate::{OpsError, OpsResult};

/// Crops `[x1, x2) x [y1, y2)` out of the image.
///
/// Corners are clamped with [`Rect::clamped`], so reversed or out-of-range
/// coordinates still produce a valid region of at least 1x1.
///
/// # Example
///
/// ```rust
/// use pixl_core::{ColorModel, PixelBuffer};
/// use pixl_ops::transform::crop;
///
/// let src = PixelBuffer::filled(100, 100, ColorModel::Grayscale, &[0]).unwrap();
/// let cropped = crop(&src, 10, 10, 5, 5).unwrap();
/// assert_eq!(cropped.dimensions(), (1, 1));
/// ```
pub fn crop(img: &PixelBuffer, x1: i64, y1: i64, x2: i64, y2: i64) -> OpsResult<PixelBuffer> {
    let rect = Rect::clamped(x1, y1, x2, y2, img.width(), img.height());
    debug!(x1, y1, x2, y2, ?rect, "crop");
    crop_rect(img, rect)
}

/// Copies an already clamped region.
fn crop_rect(img: &PixelBuffer, rect: Rect) -> OpsResult<PixelBuffer> {
    let n = img.channels();
    let (w, h) = rect.size();
    let mut dst = Vec::with_capacity(w as usize * h as usize * n);

    for y in rect.y1..rect.y2 {
        let row = img.row(y);
        dst.extend_from_slice(&row[rect.x1 as usize * n..rect.x2 as usize * n]);
    }

    Ok(PixelBuffer::from_data(w, h, img.model(), dst)?)
}

/// Crops `bbox` and rescales it by `scale` with bilinear resampling.
///
/// `bbox` is `[x1, y1, x2, y2]`. The pixels come from the bbox clamped like
/// [`crop`], but the output size follows the requested bbox:
/// `max(1, round((x2 - x1) * scale)) x max(1, round((y2 - y1) * scale))`.
/// A bbox running past the edge therefore stretches the visible part.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] if `scale` is not finite or not positive
/// - `InvalidDimensions` if the output would exceed [`pixl_core::buffer_len`]
pub fn zoom_area(img: &PixelBuffer, bbox: [i64; 4], scale: f64) -> OpsResult<PixelBuffer> {
    zoom_area_with(img, bbox, scale, Resample::Bilinear)
}

/// [`zoom_area`] with an explicit resampling filter.
pub fn zoom_area_with(
    img: &PixelBuffer,
    bbox: [i64; 4],
    scale: f64,
    filter: Resample,
) -> OpsResult<PixelBuffer> {
    let scale = ensure_finite("scale", scale)?;
    if scale <= 0.0 {
        return Err(OpsError::invalid_param(
            "scale",
            format!("must be > 0, got {scale}"),
        ));
    }

    let [x1, y1, x2, y2] = bbox;
    let rect = Rect::clamped(x1, y1, x2, y2, img.width(), img.height());
    let out_w = scaled_len(x2.saturating_sub(x1), scale);
    let out_h = scaled_len(y2.saturating_sub(y1), scale);
    buffer_len(out_w, out_h, img.channels())?;
    debug!(?rect, scale, out_w, out_h, ?filter, "zoom_area");

    let region = crop_rect(img, rect)?;
    resize(&region, out_w, out_h, filter)
}

fn scaled_len(len: i64, scale: f64) -> u32 {
    (len as f64 * scale).round().clamp(1.0, u32::MAX as f64) as u32
}

/// Color used for canvas areas not covered by the rotated image.
///
/// Deserializes from a single number or a `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    /// Single intensity; broadcast to all channels of an RGB image.
    Gray(u8),
    /// RGB triple. Grayscale images use its luma.
    Rgb([u8; 3]),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Gray(0)
    }
}

impl Fill {
    /// Fill samples for an image of the given model.
    fn samples(self, model: ColorModel) -> OpsResult<Vec<u8>> {
        match (model, self) {
            (ColorModel::Grayscale, Fill::Gray(v)) => Ok(vec![v]),
            (ColorModel::Grayscale, Fill::Rgb(c)) => Ok(vec![luma_u8(c)]),
            (ColorModel::Rgb, Fill::Gray(v)) => Ok(vec![v; 3]),
            (ColorModel::Rgb, Fill::Rgb(c)) => Ok(c.to_vec()),
            (ColorModel::Cmyk, _) => Err(OpsError::unsupported_channels(4, "rotate")),
        }
    }
}

/// Rotates counter-clockwise by `angle` degrees about the image center.
///
/// Any finite angle is accepted and wrapped into `[0, 360)`. With `expand`
/// the canvas grows to the bounding box of the rotated image, otherwise it
/// keeps the input size and corners are cut. Uncovered pixels get `fill`.
///
/// Multiples of 90 degrees are exact pixel permutations (only 90 and 270
/// on a non-square image without `expand` go through interpolation).
/// Everything else is bilinear with round-to-nearest.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] for a non-finite angle
/// - `UnsupportedChannelCount` for CMYK input
pub fn rotate(img: &PixelBuffer, angle: f64, expand: bool, fill: Fill) -> OpsResult<PixelBuffer> {
    let angle = ensure_finite("angle", angle)?.rem_euclid(360.0);
    let fill = fill.samples(img.model())?;
    let (w, h) = img.dimensions();
    debug!(w, h, angle, expand, "rotate");

    let square = w == h;
    if angle == 0.0 {
        trace!("rotate: identity");
        return Ok(img.with_data(img.data().to_vec())?);
    } else if angle == 180.0 {
        trace!("rotate: 180 fast path");
        return rotate_quarter(img, 2);
    } else if angle == 90.0 && (expand || square) {
        trace!("rotate: 90 fast path");
        return rotate_quarter(img, 1);
    } else if angle == 270.0 && (expand || square) {
        trace!("rotate: 270 fast path");
        return rotate_quarter(img, 3);
    }

    rotate_bilinear(img, angle.to_radians(), expand, &fill)
}

/// Lossless counter-clockwise rotation by `quarters * 90` degrees.
fn rotate_quarter(img: &PixelBuffer, quarters: u8) -> OpsResult<PixelBuffer> {
    let n = img.channels();
    let (w, h) = img.dimensions();
    let (ow, oh) = if quarters % 2 == 1 { (h, w) } else { (w, h) };
    let (wu, hu) = (w as usize, h as usize);
    let src = img.data();

    let mut dst = vec![0u8; ow as usize * oh as usize * n];
    fill_rows(&mut dst, ow as usize * n, |y, row| {
        for x in 0..ow as usize {
            let (sx, sy) = match quarters {
                1 => (wu - 1 - y, x),
                2 => (wu - 1 - x, hu - 1 - y),
                _ => (y, hu - 1 - x),
            };
            let s = (sy * wu + sx) * n;
            row[x * n..(x + 1) * n].copy_from_slice(&src[s..s + n]);
        }
    });

    Ok(PixelBuffer::from_data(ow, oh, img.model(), dst)?)
}

/// Canvas size holding a `w x h` rectangle rotated by `theta`.
fn expanded_size(w: u32, h: u32, theta: f64) -> (u32, u32) {
    let (sin, cos) = theta.sin_cos();
    let (wf, hf) = (w as f64, h as f64);
    let ew = wf * cos.abs() + hf * sin.abs();
    let eh = wf * sin.abs() + hf * cos.abs();
    // Absorb float noise so 100.0000000001 stays 100.
    let fit = |v: f64| (v - 1e-9).ceil().max(1.0) as u32;
    (fit(ew), fit(eh))
}

/// General rotation by inverse mapping with bilinear sampling.
fn rotate_bilinear(
    img: &PixelBuffer,
    theta: f64,
    expand: bool,
    fill: &[u8],
) -> OpsResult<PixelBuffer> {
    let n = img.channels();
    let (w, h) = img.dimensions();
    let (ow, oh) = if expand {
        expanded_size(w, h, theta)
    } else {
        (w, h)
    };
    trace!(ow, oh, "rotate: bilinear");
    buffer_len(ow, oh, n)?;

    let (sin, cos) = theta.sin_cos();
    let (wf, hf) = (w as f64, h as f64);
    let (icx, icy) = (wf / 2.0, hf / 2.0);
    let (ocx, ocy) = (ow as f64 / 2.0, oh as f64 / 2.0);
    let src = img.data();
    let (wu, hu) = (w as usize, h as usize);

    let mut dst = vec![0u8; ow as usize * oh as usize * n];
    fill_rows(&mut dst, ow as usize * n, |y, row| {
        let v = y as f64 + 0.5 - ocy;
        for x in 0..ow as usize {
            let u = x as f64 + 0.5 - ocx;
            // Inverse of a y-down counter-clockwise rotation
            let fx = u * cos - v * sin + icx;
            let fy = u * sin + v * cos + icy;
            let out = &mut row[x * n..(x + 1) * n];

            if fx < 0.0 || fy < 0.0 || fx >= wf || fy >= hf {
                out.copy_from_slice(fill);
                continue;
            }

            // Pixel centers sit at +0.5
            let sx = fx - 0.5;
            let sy = fy - 0.5;
            let x0f = sx.floor();
            let y0f = sy.floor();
            let tx = (sx - x0f) as f32;
            let ty = (sy - y0f) as f32;
            let x0 = (x0f.max(0.0) as usize).min(wu - 1);
            let y0 = (y0f.max(0.0) as usize).min(hu - 1);
            let x1 = ((x0f + 1.0).max(0.0) as usize).min(wu - 1);
            let y1 = ((y0f + 1.0).max(0.0) as usize).min(hu - 1);

            let p00 = &src[(y0 * wu + x0) * n..];
            let p10 = &src[(y0 * wu + x1) * n..];
            let p01 = &src[(y1 * wu + x0) * n..];
            let p11 = &src[(y1 * wu + x1) * n..];
            for c in 0..n {
                let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
                let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
                out[c] = round_to_u8(top * (1.0 - ty) + bottom * ty);
            }
        }
    });

    Ok(PixelBuffer::from_data(ow, oh, img.model(), dst)?)
}
