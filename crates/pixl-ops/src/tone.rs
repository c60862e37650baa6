//! Brightness and contrast curves.
//!
//! Every operation here is a per-sample point transform, so each one is
//! evaluated once per input level into a 256-entry table and applied with
//! [`map_lut`] / [`map_channel_luts`].
//!
//! | operation                  | curve                                      |
//! |----------------------------|--------------------------------------------|
//! | [`brightness_global`]      | `s = r + delta`                            |
//! | [`brightness_per_channel`] | `s = r + delta[c]`                         |
//! | [`contrast_log`]           | `s = c * ln(1 + r)`                        |
//! | [`contrast_exp`]           | `s = 255 * (e^(k r) - 1) / (e^(255 k) - 1)`|
//! | [`contrast_gamma`]         | `s = 255 * (r / 255)^gamma`                |
//!
//! Results are clipped to `[0, 255]` and truncated.

use pixl_core::pixel::{offset_u8, quantize};
use pixl_core::PixelBuffer;
use tracing::{debug, trace};

use crate::error::ensure_finite;
use crate::parallel::{map_channel_luts, map_lut};
use crate::{OpsError, OpsResult};

/// Guard added to the exponential curve's denominator.
pub const EXP_DENOM_EPSILON: f64 = 1e-12;

/// Default `k` of [`contrast_exp`].
pub const DEFAULT_EXP_K: f64 = 0.01;

/// Default `c` of [`contrast_log`]: maps 255 onto 255.
pub fn default_log_c() -> f64 {
    255.0 / 256f64.ln()
}

/// Tabulates `f` over all 256 input levels.
pub fn build_lut(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = quantize(f(i as f64));
    }
    lut
}

fn offset_lut(delta: i32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = offset_u8(i as u8, delta);
    }
    lut
}

fn apply_lut(img: &PixelBuffer, lut: &[u8; 256]) -> OpsResult<PixelBuffer> {
    Ok(img.with_data(map_lut(img.data(), lut))?)
}

/// Adds `delta` to every sample, saturating at 0 and 255.
///
/// Works on any color model.
///
/// # Example
///
/// ```rust
/// use pixl_core::{ColorModel, PixelBuffer};
/// use pixl_ops::tone::brightness_global;
///
/// let img = PixelBuffer::from_data(2, 1, ColorModel::Grayscale, vec![200, 10]).unwrap();
/// let out = brightness_global(&img, 80).unwrap();
/// assert_eq!(out.data(), &[255, 90]);
/// ```
pub fn brightness_global(img: &PixelBuffer, delta: i32) -> OpsResult<PixelBuffer> {
    debug!(delta, w = img.width(), h = img.height(), "brightness_global");
    apply_lut(img, &offset_lut(delta))
}

/// Adds a separate delta to each of R, G and B.
///
/// Grayscale input is broadcast to RGB first; the result is always RGB.
///
/// # Errors
///
/// `UnsupportedChannelCount` for CMYK input.
pub fn brightness_per_channel(
    img: &PixelBuffer,
    delta_r: i32,
    delta_g: i32,
    delta_b: i32,
) -> OpsResult<PixelBuffer> {
    debug!(delta_r, delta_g, delta_b, "brightness_per_channel");
    let rgb = img.to_rgb()?;
    let luts = [delta_r, delta_g, delta_b].map(offset_lut);
    Ok(rgb.with_data(map_channel_luts(rgb.data(), &luts))?)
}

/// Logarithmic curve `s = c * ln(1 + r)`.
///
/// `None` uses [`default_log_c`], which spans the full output range.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `c` is not finite.
pub fn contrast_log(img: &PixelBuffer, c: Option<f64>) -> OpsResult<PixelBuffer> {
    let c = match c {
        Some(c) => ensure_finite("c", c)?,
        None => default_log_c(),
    };
    debug!(c, "contrast_log");
    let lut = build_lut(|r| c * r.ln_1p());
    trace!(lut_255 = lut[255], "contrast_log lut");
    apply_lut(img, &lut)
}

/// Exponential curve, normalized so that 255 maps to 255.
///
/// Larger `k` darkens shadows harder. The denominator carries
/// [`EXP_DENOM_EPSILON`], so `k = 0` yields a black image instead of a
/// division by zero. Negative `k` gives the mirrored (brightening) curve.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `k` is not finite.
pub fn contrast_exp(img: &PixelBuffer, k: f64) -> OpsResult<PixelBuffer> {
    let k = ensure_finite("k", k)?;
    debug!(k, "contrast_exp");
    let lut = build_lut(|r| exp_curve(r, k) * 255.0);
    apply_lut(img, &lut)
}

/// `(e^(k r) - 1) / (e^(255 k) - 1 + eps)`, without overflow for large `k`.
fn exp_curve(r: f64, k: f64) -> f64 {
    if k > 1.0 {
        // e^(255k) overflows past k ~ 2.78; factor it out of both terms.
        (k * (r - 255.0)).exp() * (-(-k * r).exp_m1()) / (-(-255.0 * k).exp_m1())
    } else {
        (k * r).exp_m1() / ((255.0 * k).exp_m1() + EXP_DENOM_EPSILON)
    }
}

/// Power-law curve `s = 255 * (r / 255)^gamma`.
///
/// `gamma < 1` brightens, `gamma > 1` darkens.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `gamma` is finite and `> 0`.
pub fn contrast_gamma(img: &PixelBuffer, gamma: f64) -> OpsResult<PixelBuffer> {
    let gamma = ensure_finite("gamma", gamma)?;
    if gamma <= 0.0 {
        return Err(OpsError::invalid_param(
            "gamma",
            format!("must be > 0, got {gamma}"),
        ));
    }
    debug!(gamma, "contrast_gamma");
    let lut = build_lut(|r| 255.0 * (r / 255.0).powf(gamma));
    apply_lut(img, &lut)
}
