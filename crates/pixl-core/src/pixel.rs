//! Sample-level helpers: luma weights, clamping and quantization.
//!
//! Every transform in the workspace funnels its float results through one
//! of the quantizers below, which is what keeps the `[0, 255]` invariant
//! of [`crate::PixelBuffer`] in one place.
//!
//! # Quantization
//!
//! - [`quantize`] truncates toward zero like an `as u8` cast of a clipped
//!   float, after adding [`QUANT_TOLERANCE`] so that results which are
//!   mathematically integral (e.g. `255 / ln 256 * ln 256`) are not pushed
//!   one level down by representation error.
//! - [`round_to_u8`] rounds to nearest; used by resampling and rotation.

// ============================================================================
// Rec.709 Luma Constants
// ============================================================================

/// Rec.709 luma coefficient for red channel.
pub const REC709_LUMA_R: f64 = 0.2126;

/// Rec.709 luma coefficient for green channel.
pub const REC709_LUMA_G: f64 = 0.7152;

/// Rec.709 luma coefficient for blue channel.
pub const REC709_LUMA_B: f64 = 0.0722;

/// Rec.709 luma coefficients as an array [R, G, B].
pub const REC709_LUMA: [f64; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Slack added before truncating float results to 8 bits.
pub const QUANT_TOLERANCE: f64 = 1e-6;

/// Rec.709 luma of an 8-bit RGB triple, truncated to 8 bits.
///
/// ```
/// use pixl_core::pixel::luma_u8;
/// assert_eq!(luma_u8([255, 255, 255]), 255);
/// assert_eq!(luma_u8([255, 0, 0]), 54); // 0.2126 * 255 = 54.21
/// ```
#[inline]
pub fn luma_u8(rgb: [u8; 3]) -> u8 {
    quantize(luma_f64(rgb))
}

/// Rec.709 luma of an 8-bit RGB triple, unquantized.
#[inline]
pub fn luma_f64(rgb: [u8; 3]) -> f64 {
    rgb[0] as f64 * REC709_LUMA_R + rgb[1] as f64 * REC709_LUMA_G + rgb[2] as f64 * REC709_LUMA_B
}

/// Unweighted mean of an 8-bit RGB triple, truncated.
#[inline]
pub fn average_u8(rgb: [u8; 3]) -> u8 {
    let sum = rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16;
    (sum / 3) as u8
}

/// Clips to `[0, 255]` and truncates. NaN maps to 0.
#[inline]
pub fn quantize(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v + QUANT_TOLERANCE).clamp(0.0, 255.0) as u8
}

/// Clips to `[0, 255]` and rounds to nearest. NaN maps to 0.
#[inline]
pub fn round_to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Adds a signed delta to a sample with saturation at both ends.
#[inline]
pub fn offset_u8(sample: u8, delta: i32) -> u8 {
    (sample as i32).saturating_add(delta).clamp(0, 255) as u8
}

/// Numeric sample types accepted by normalization.
///
/// Conversion clamps into `[0, 255]` and truncates; it does **not**
/// rescale (a `u16` value of 1000 becomes 255, not 3).
pub trait Sample: Copy + Send + Sync + 'static {
    /// Human-readable type name for diagnostics.
    const NAME: &'static str;

    /// Clamp into the 8-bit range and truncate.
    fn to_u8_clamped(self) -> u8;
}

impl Sample for u8 {
    const NAME: &'static str = "u8";

    #[inline]
    fn to_u8_clamped(self) -> u8 {
        self
    }
}

impl Sample for u16 {
    const NAME: &'static str = "u16";

    #[inline]
    fn to_u8_clamped(self) -> u8 {
        self.min(255) as u8
    }
}

impl Sample for i32 {
    const NAME: &'static str = "i32";

    #[inline]
    fn to_u8_clamped(self) -> u8 {
        self.clamp(0, 255) as u8
    }
}

impl Sample for f32 {
    const NAME: &'static str = "f32";

    #[inline]
    fn to_u8_clamped(self) -> u8 {
        // `as` saturates and sends NaN to 0.
        self.clamp(0.0, 255.0) as u8
    }
}

impl Sample for f64 {
    const NAME: &'static str = "f64";

    #[inline]
    fn to_u8_clamped(self) -> u8 {
        self.clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_weights_sum_to_one() {
        let sum: f64 = REC709_LUMA.iter().sum();
        approx::assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_luma_f64_uses_weights() {
        assert_eq!(luma_f64([1, 0, 0]), REC709_LUMA_R);
        assert_eq!(luma_f64([0, 1, 0]), REC709_LUMA_G);
        assert_eq!(luma_f64([0, 0, 1]), REC709_LUMA_B);
    }

    #[test]
    fn test_luma_u8() {
        assert_eq!(luma_u8([0, 0, 0]), 0);
        assert_eq!(luma_u8([255, 255, 255]), 255);
        assert_eq!(luma_u8([0, 255, 0]), 182); // 182.376
        assert_eq!(luma_u8([0, 0, 255]), 18); // 18.411
    }

    #[test]
    fn test_average_u8() {
        assert_eq!(average_u8([255, 255, 255]), 255);
        assert_eq!(average_u8([10, 20, 31]), 20);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(300.0), 255);
        assert_eq!(quantize(127.9), 127);
        assert_eq!(quantize(254.999_999_9), 255);
        assert_eq!(quantize(f64::NAN), 0);
    }

    #[test]
    fn test_round_to_u8() {
        assert_eq!(round_to_u8(127.5), 128);
        assert_eq!(round_to_u8(-0.4), 0);
        assert_eq!(round_to_u8(1e9), 255);
    }

    #[test]
    fn test_offset_u8() {
        assert_eq!(offset_u8(200, 80), 255);
        assert_eq!(offset_u8(20, -80), 0);
        assert_eq!(offset_u8(5, i32::MAX), 255);
        assert_eq!(offset_u8(5, i32::MIN), 0);
    }

    #[test]
    fn test_sample_clamping() {
        assert_eq!(1000u16.to_u8_clamped(), 255);
        assert_eq!((-4i32).to_u8_clamped(), 0);
        assert_eq!(12.9f32.to_u8_clamped(), 12);
        assert_eq!(f32::NAN.to_u8_clamped(), 0);
        assert_eq!(256.0f64.to_u8_clamped(), 255);
    }
}
