//! # pixl-core
//!
//! Core types for 8-bit raster transforms.
//!
//! - [`PixelBuffer`] - immutable, shareable W x H x C raster
//! - [`ColorModel`] - runtime tag for grayscale, RGB and CMYK layouts
//! - [`Rect`] - pixel regions with clamping construction
//! - [`normalize`] - turns raw or decoded input into a [`PixelBuffer`]
//!
//! ## Crate Structure
//!
//! ```text
//! pixl-core (this crate)
//!    ^
//!    |
//!    +-- pixl-ops (geometry, tone, color, histogram, compositing)
//!    +-- pixl-cli
//! ```
//!
//! Every operation in `pixl-ops` takes `&PixelBuffer` and returns a new
//! buffer; nothing here is ever mutated in place.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colormodel;
pub mod error;
pub mod image;
pub mod pixel;
pub mod rect;
pub mod source;

pub use colormodel::ColorModel;
pub use error::{Error, Result};
pub use image::{MAX_DIMENSION, MAX_SAMPLES, PixelBuffer, buffer_len};
pub use pixel::{REC709_LUMA, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R, average_u8, luma_u8};
pub use rect::Rect;
pub use source::{DecodedImage, DecodedLayout, ImageSource, RawSamples, SampleSlice, normalize};

/// Prelude module for convenient imports.
///
/// ```
/// use pixl_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::colormodel::ColorModel;
    pub use crate::error::{Error, Result};
    pub use crate::image::PixelBuffer;
    pub use crate::pixel::{luma_u8, quantize};
    pub use crate::rect::Rect;
    pub use crate::source::{ImageSource, RawSamples, SampleSlice, normalize};
}
