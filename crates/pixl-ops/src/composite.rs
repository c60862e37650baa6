//! Alpha blending of two images.
//!
//! - [`blend`] - `alpha * A + (1 - alpha) * B`
//! - [`blend_equalized`] - same, after equalizing both operands
//!
//! Both operands are widened to RGB explicitly and `B` is resampled to the
//! size of `A` with [`match_size`], so any two non-CMYK images can be
//! combined.
//!
//! # Example
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//! use pixl_ops::composite::{blend, BlendParams};
//!
//! let a = PixelBuffer::filled(4, 4, ColorModel::Rgb, &[200, 0, 0]).unwrap();
//! let b = PixelBuffer::filled(2, 2, ColorModel::Grayscale, &[100]).unwrap();
//!
//! let out = blend(&a, &b, BlendParams::new(0.5).unwrap()).unwrap();
//! assert_eq!(out.dimensions(), (4, 4));
//! assert_eq!(out.pixel(0, 0), &[150, 50, 50]);
//! ```

use pixl_core::PixelBuffer;
use pixl_core::pixel::quantize;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::rgb_operand;
use crate::error::ensure_finite;
use crate::histogram::{equalize_luminance, equalize_per_channel};
use crate::parallel::fill_rows;
use crate::resize::match_size;
use crate::OpsResult;

/// Blend weight of the first operand, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendParams {
    alpha: f64,
}

impl BlendParams {
    /// Clamps `alpha` into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`crate::OpsError::InvalidParameter`] if `alpha` is NaN or infinite.
    pub fn new(alpha: f64) -> OpsResult<Self> {
        let alpha = ensure_finite("alpha", alpha)?.clamp(0.0, 1.0);
        Ok(Self { alpha })
    }

    /// Weight of the first operand.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for BlendParams {
    fn default() -> Self {
        Self { alpha: 0.5 }
    }
}

/// How [`blend_equalized`] equalizes its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualizeMode {
    /// [`equalize_per_channel`] on R, G and B.
    #[default]
    PerChannel,
    /// [`equalize_luminance`].
    Luminance,
}

/// Blends `a` and `b` as `alpha * a + (1 - alpha) * b`.
///
/// The result has the dimensions of `a` and is RGB.
///
/// # Errors
///
/// `UnsupportedChannelCount` if either operand is CMYK.
pub fn blend(a: &PixelBuffer, b: &PixelBuffer, params: BlendParams) -> OpsResult<PixelBuffer> {
    let a = rgb_operand(a, "blend")?;
    let b = rgb_operand(b, "blend")?;
    debug!(
        a_w = a.width(),
        a_h = a.height(),
        b_w = b.width(),
        b_h = b.height(),
        alpha = params.alpha,
        "blend"
    );
    let b = match_size(&a, &b)?;

    let alpha = params.alpha;
    let beta = 1.0 - alpha;
    let (pa, pb) = (a.data(), b.data());
    let stride = a.width() as usize * 3;

    let mut dst = vec![0u8; pa.len()];
    fill_rows(&mut dst, stride, |y, row| {
        let ra = &pa[y * stride..(y + 1) * stride];
        let rb = &pb[y * stride..(y + 1) * stride];
        for ((d, &va), &vb) in row.iter_mut().zip(ra).zip(rb) {
            *d = quantize(alpha * va as f64 + beta * vb as f64);
        }
    });

    Ok(a.with_data(dst)?)
}

/// Resizes `b` to `a`, equalizes both, then [`blend`]s them.
pub fn blend_equalized(
    a: &PixelBuffer,
    b: &PixelBuffer,
    params: BlendParams,
    mode: EqualizeMode,
) -> OpsResult<PixelBuffer> {
    debug!(alpha = params.alpha, ?mode, "blend_equalized");
    let a = rgb_operand(a, "blend_equalized")?;
    let b = match_size(&a, &rgb_operand(b, "blend_equalized")?)?;

    let (a, b) = match mode {
        EqualizeMode::PerChannel => (equalize_per_channel(&a)?, equalize_per_channel(&b)?),
        EqualizeMode::Luminance => (equalize_luminance(&a)?, equalize_luminance(&b)?),
    };
    trace!("operands equalized");
    blend(&a, &b, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpsError;
    use pixl_core::ColorModel;

    #[test]
    fn test_params_clamp() {
        assert_eq!(BlendParams::new(1.7).unwrap().alpha(), 1.0);
        assert_eq!(BlendParams::new(-0.2).unwrap().alpha(), 0.0);
        assert_eq!(BlendParams::new(0.25).unwrap().alpha(), 0.25);
        assert!(matches!(
            BlendParams::new(f64::NAN),
            Err(OpsError::InvalidParameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn test_blend_endpoints() {
        let a = PixelBuffer::filled(3, 2, ColorModel::Rgb, &[10, 20, 30]).unwrap();
        let b = PixelBuffer::filled(3, 2, ColorModel::Rgb, &[200, 100, 0]).unwrap();

        let only_a = blend(&a, &b, BlendParams::new(1.0).unwrap()).unwrap();
        assert_eq!(only_a, a);

        let only_b = blend(&a, &b, BlendParams::new(0.0).unwrap()).unwrap();
        assert_eq!(only_b, b);

        let mid = blend(&a, &b, BlendParams::default()).unwrap();
        assert_eq!(mid.pixel(2, 1), &[105, 60, 15]);
    }

    #[test]
    fn test_blend_resizes_second_operand() {
        let a = PixelBuffer::filled(8, 3, ColorModel::Grayscale, &[0]).unwrap();
        let b = PixelBuffer::filled(2, 7, ColorModel::Rgb, &[255, 255, 255]).unwrap();
        let out = blend(&a, &b, BlendParams::new(0.5).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (8, 3));
        assert_eq!(out.model(), ColorModel::Rgb);
        assert!(out.data().iter().all(|&v| v == 127));
    }

    #[test]
    fn test_blend_rejects_cmyk() {
        let a = PixelBuffer::filled(1, 1, ColorModel::Rgb, &[0, 0, 0]).unwrap();
        let c = PixelBuffer::filled(1, 1, ColorModel::Cmyk, &[0, 0, 0, 0]).unwrap();
        assert!(blend(&a, &c, BlendParams::default()).is_err());
        assert!(blend_equalized(&c, &a, BlendParams::default(), EqualizeMode::Luminance).is_err());
    }

    #[test]
    fn test_blend_equalized() {
        // Two levels each: equalization pushes both to 0 and 255
        let a = PixelBuffer::from_data(2, 1, ColorModel::Grayscale, vec![100, 110]).unwrap();
        let b = PixelBuffer::from_data(2, 1, ColorModel::Grayscale, vec![30, 40]).unwrap();

        let out = blend_equalized(&a, &b, BlendParams::new(1.0).unwrap(), EqualizeMode::PerChannel)
            .unwrap();
        assert_eq!(out.data(), &[0, 0, 0, 255, 255, 255]);

        let out = blend_equalized(&a, &b, BlendParams::new(0.0).unwrap(), EqualizeMode::Luminance)
            .unwrap();
        assert_eq!(out.pixel(0, 0), &[0, 0, 0]);
        assert_eq!(out.pixel(1, 0), &[255, 255, 255]);
    }
}
