//! Pixel-space rectangles with clamping construction.
//!
//! # Coordinate System
//!
//! Origin (0, 0) is the **top-left** corner, X grows right, Y grows down.
//! A [`Rect`] is stored as two corners: `(x1, y1)` inclusive and
//! `(x2, y2)` exclusive, so its size is `(x2 - x1) x (y2 - y1)`.
//!
//! ```text
//! (x1,y1) ──────────┐
//!   │               │
//!   │    region     │
//!   │               │
//!   └────────── (x2,y2)   <- first column/row NOT in the region
//! ```
//!
//! # Usage
//!
//! ```rust
//! use pixl_core::Rect;
//!
//! // Reversed corners on a 100x100 image still give a valid 1x1 region.
//! let r = Rect::clamped(10, 10, 5, 5, 100, 100);
//! assert_eq!((r.x1, r.y1, r.x2, r.y2), (10, 10, 11, 11));
//! ```

use crate::{Error, Result};

/// Axis-aligned region `[x1, x2) x [y1, y2)`.
///
/// # Invariants
///
/// Values produced by [`Rect::clamped`] always satisfy
/// `0 <= x1 < x2 <= width` and `0 <= y1 < y2 <= height` for the image
/// they were clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge (inclusive)
    pub x1: u32,
    /// Top edge (inclusive)
    pub y1: u32,
    /// Right edge (exclusive)
    pub x2: u32,
    /// Bottom edge (exclusive)
    pub y2: u32,
}

impl Rect {
    /// Creates a rectangle from exact corners.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] when the region has zero or negative area.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Result<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(Error::InvalidRegion { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Clamps arbitrary corners into a `width x height` image.
    ///
    /// The origin is clamped to the last valid pixel, then each far edge is
    /// clamped to `[origin + 1, size]`. The result is never smaller than
    /// 1x1, whatever the input.
    ///
    /// `width` and `height` must be non-zero, which every
    /// [`crate::PixelBuffer`] guarantees.
    pub fn clamped(x1: i64, y1: i64, x2: i64, y2: i64, width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "clamping against an empty image");
        let w = width.max(1) as i64;
        let h = height.max(1) as i64;

        let x1 = x1.clamp(0, w - 1);
        let y1 = y1.clamp(0, h - 1);
        let x2 = x2.clamp(x1 + 1, w);
        let y2 = y2.clamp(y1 + 1, h);

        Self {
            x1: x1 as u32,
            y1: y1 as u32,
            x2: x2 as u32,
            y2: y2 as u32,
        }
    }

    /// Rectangle covering a whole `width x height` image.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x1: 0,
            y1: 0,
            x2: width,
            y2: height,
        }
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Returns (width, height).
    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// `true` if the pixel `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}
