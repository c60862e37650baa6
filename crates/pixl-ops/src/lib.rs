//! # pixl-ops
//!
//! Pixel-level transforms over [`pixl_core::PixelBuffer`].
//!
//! Every operation is a pure function: it borrows its input and returns a
//! freshly allocated buffer or a typed [`OpsError`].
//!
//! # Modules
//!
//! - [`transform`] - Crop, zoom and rotation
//! - [`resize`] - Resampling and size matching
//! - [`tone`] - Brightness and contrast curves
//! - [`color`] - Grayscale, inversion, binarization, CMYK
//! - [`histogram`] - Histograms and equalization
//! - [`composite`] - Alpha blending
//! - [`recipe`] - Serializable filter stacks
//!
//! # Example
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//! use pixl_ops::{color, tone, transform};
//!
//! let img = PixelBuffer::filled(64, 32, ColorModel::Rgb, &[120, 80, 40]).unwrap();
//!
//! let img = tone::contrast_gamma(&img, 0.8).unwrap();
//! let img = transform::rotate(&img, 90.0, true, transform::Fill::default()).unwrap();
//! let img = color::binarize(&img, 100).unwrap();
//! assert_eq!(img.dimensions(), (32, 64));
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - run per-pixel loops on the rayon thread pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod color;
pub mod composite;
pub mod histogram;
pub mod parallel;
pub mod recipe;
pub mod resize;
pub mod tone;
pub mod transform;

pub use error::{OpsError, OpsResult};

pub use color::{
    CmykChannel, GrayMethod, binarize, extract_channel, extract_cmyk_layers, extract_rgb_layers,
    invert, rgb_to_cmyk, suppress_cmyk_channel, to_grayscale,
};
pub use composite::{BlendParams, EqualizeMode, blend, blend_equalized};
pub use histogram::{
    CdfMapping, ChannelHistograms, Histogram, equalize_channel, equalize_luminance,
    equalize_per_channel, histogram,
};
pub use recipe::{Recipe, RecipeError, Step};
pub use resize::{Resample, match_size, resize};
pub use tone::{
    brightness_global, brightness_per_channel, contrast_exp, contrast_gamma, contrast_log,
};
pub use transform::{Fill, crop, rotate, zoom_area, zoom_area_with};
