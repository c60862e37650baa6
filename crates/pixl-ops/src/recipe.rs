//! Recipes: ordered, serializable lists of adjustments.
//!
//! A recipe replays its steps on a buffer the caller owns. Re-applying the
//! same recipe to the original image is how an editor redoes a stack of
//! filters after one slider changes; no state is kept between calls.
//!
//! # Format
//!
//! ```yaml
//! steps:
//!   - filter: brightness_global
//!     delta: 20
//!   - filter: contrast_gamma
//!     gamma: 0.8
//!   - filter: rotate
//!     angle: 30
//!     fill: [255, 255, 255]
//!   - filter: binarize
//! ```
//!
//! Omitted parameters take the editor defaults: `k = 0.01`,
//! `gamma = 1.0`, `threshold = 128`, zoom `scale = 2.0`,
//! rotate `expand = true` and `fill = 0`, grayscale `method = luma`.
//!
//! # Example
//!
//! ```rust
//! use pixl_core::{ColorModel, PixelBuffer};
//! use pixl_ops::recipe::Recipe;
//!
//! let recipe = Recipe::from_yaml_str("steps:\n  - filter: invert\n").unwrap();
//! let img = PixelBuffer::filled(2, 2, ColorModel::Grayscale, &[10]).unwrap();
//! assert_eq!(recipe.apply(&img).unwrap().data(), &[245; 4]);
//! ```

use std::path::Path;

use pixl_core::PixelBuffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::color::{
    CmykChannel, GrayMethod, binarize, extract_channel, invert, rgb_to_cmyk,
    suppress_cmyk_channel, to_grayscale,
};
use crate::histogram::{equalize_luminance, equalize_per_channel};
use crate::resize::{Resample, resize};
use crate::tone::{
    DEFAULT_EXP_K, brightness_global, brightness_per_channel, contrast_exp, contrast_gamma,
    contrast_log,
};
use crate::transform::{Fill, crop, rotate, zoom_area_with};
use crate::{OpsError, OpsResult};

/// Errors raised while loading or applying a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// I/O error reading a recipe file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A step failed.
    #[error("step {index} ({filter}): {source}")]
    Ops {
        /// Zero-based position of the failing step
        index: usize,
        /// Filter name of the failing step
        filter: &'static str,
        /// Underlying error
        #[source]
        source: OpsError,
    },
}

/// Result type for recipe operations.
pub type RecipeResult<T> = Result<T, RecipeError>;

fn default_threshold() -> u8 {
    128
}

fn default_k() -> f64 {
    DEFAULT_EXP_K
}

fn default_gamma() -> f64 {
    1.0
}

fn default_zoom_scale() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// One adjustment and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum Step {
    /// [`brightness_global`]
    BrightnessGlobal {
        /// Added to every sample
        delta: i32,
    },
    /// [`brightness_per_channel`]
    BrightnessPerChannel {
        /// Red delta
        #[serde(default)]
        delta_r: i32,
        /// Green delta
        #[serde(default)]
        delta_g: i32,
        /// Blue delta
        #[serde(default)]
        delta_b: i32,
    },
    /// [`contrast_log`]
    ContrastLog {
        /// Scale; full-range default when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        c: Option<f64>,
    },
    /// [`contrast_exp`]
    ContrastExp {
        /// Steepness
        #[serde(default = "default_k")]
        k: f64,
    },
    /// [`contrast_gamma`]
    ContrastGamma {
        /// Exponent, must be > 0
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
    /// [`to_grayscale`]
    Grayscale {
        /// Reduction method
        #[serde(default)]
        method: GrayMethod,
    },
    /// [`invert`]
    Invert,
    /// [`binarize`]
    Binarize {
        /// Levels at or above become white
        #[serde(default = "default_threshold")]
        threshold: u8,
    },
    /// [`rgb_to_cmyk`]
    RgbToCmyk,
    /// [`extract_channel`]
    ExtractChannel {
        /// Channel to keep
        index: usize,
    },
    /// [`suppress_cmyk_channel`]
    SuppressCmyk {
        /// Channel to drop: c, m, y or k
        channel: CmykChannel,
    },
    /// [`crop`]
    Crop {
        /// Left edge
        x1: i64,
        /// Top edge
        y1: i64,
        /// Right edge (exclusive)
        x2: i64,
        /// Bottom edge (exclusive)
        y2: i64,
    },
    /// [`zoom_area_with`]
    Zoom {
        /// Left edge
        x1: i64,
        /// Top edge
        y1: i64,
        /// Right edge (exclusive)
        x2: i64,
        /// Bottom edge (exclusive)
        y2: i64,
        /// Magnification
        #[serde(default = "default_zoom_scale")]
        scale: f64,
        /// Resampling filter
        #[serde(default)]
        resample: Resample,
    },
    /// [`rotate`]
    Rotate {
        /// Degrees, counter-clockwise
        angle: f64,
        /// Grow the canvas to fit
        #[serde(default = "default_true")]
        expand: bool,
        /// Color of uncovered areas
        #[serde(default)]
        fill: Fill,
    },
    /// [`resize`]
    Resize {
        /// Target width
        width: u32,
        /// Target height
        height: u32,
        /// Resampling filter
        #[serde(default)]
        resample: Resample,
    },
    /// [`equalize_per_channel`]
    EqualizePerChannel,
    /// [`equalize_luminance`]
    EqualizeLuminance,
}

impl Step {
    /// Filter name as written in recipe files.
    pub fn name(&self) -> &'static str {
        match self {
            Step::BrightnessGlobal { .. } => "brightness_global",
            Step::BrightnessPerChannel { .. } => "brightness_per_channel",
            Step::ContrastLog { .. } => "contrast_log",
            Step::ContrastExp { .. } => "contrast_exp",
            Step::ContrastGamma { .. } => "contrast_gamma",
            Step::Grayscale { .. } => "grayscale",
            Step::Invert => "invert",
            Step::Binarize { .. } => "binarize",
            Step::RgbToCmyk => "rgb_to_cmyk",
            Step::ExtractChannel { .. } => "extract_channel",
            Step::SuppressCmyk { .. } => "suppress_cmyk",
            Step::Crop { .. } => "crop",
            Step::Zoom { .. } => "zoom",
            Step::Rotate { .. } => "rotate",
            Step::Resize { .. } => "resize",
            Step::EqualizePerChannel => "equalize_per_channel",
            Step::EqualizeLuminance => "equalize_luminance",
        }
    }

    /// Runs this step on `img`.
    pub fn apply(&self, img: &PixelBuffer) -> OpsResult<PixelBuffer> {
        match *self {
            Step::BrightnessGlobal { delta } => brightness_global(img, delta),
            Step::BrightnessPerChannel {
                delta_r,
                delta_g,
                delta_b,
            } => brightness_per_channel(img, delta_r, delta_g, delta_b),
            Step::ContrastLog { c } => contrast_log(img, c),
            Step::ContrastExp { k } => contrast_exp(img, k),
            Step::ContrastGamma { gamma } => contrast_gamma(img, gamma),
            Step::Grayscale { method } => to_grayscale(img, method),
            Step::Invert => invert(img),
            Step::Binarize { threshold } => binarize(img, threshold),
            Step::RgbToCmyk => rgb_to_cmyk(img),
            Step::ExtractChannel { index } => extract_channel(img, index),
            Step::SuppressCmyk { channel } => suppress_cmyk_channel(img, channel),
            Step::Crop { x1, y1, x2, y2 } => crop(img, x1, y1, x2, y2),
            Step::Zoom {
                x1,
                y1,
                x2,
                y2,
                scale,
                resample,
            } => zoom_area_with(img, [x1, y1, x2, y2], scale, resample),
            Step::Rotate {
                angle,
                expand,
                fill,
            } => rotate(img, angle, expand, fill),
            Step::Resize {
                width,
                height,
                resample,
            } => resize(img, width, height, resample),
            Step::EqualizePerChannel => equalize_per_channel(img),
            Step::EqualizeLuminance => equalize_luminance(img),
        }
    }
}

/// Ordered list of [`Step`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Steps, applied first to last.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Recipe from a list of steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Loads a recipe from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> RecipeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let recipe = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), steps = recipe.steps.len(), "loaded recipe");
        Ok(recipe)
    }

    /// Parses a recipe from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> RecipeResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes the recipe back to YAML.
    pub fn to_yaml_string(&self) -> RecipeResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Appends a step.
    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// `true` if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Replays every step on `img`; the input is left untouched.
    ///
    /// An empty recipe returns a clone of `img`.
    pub fn apply(&self, img: &PixelBuffer) -> RecipeResult<PixelBuffer> {
        let mut current = img.clone();
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, filter = step.name(), "recipe step");
            current = step.apply(&current).map_err(|source| RecipeError::Ops {
                index,
                filter: step.name(),
                source,
            })?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixl_core::ColorModel;

    const EDITOR_RECIPE: &str = r#"
steps:
  - filter: brightness_global
    delta: 20
  - filter: contrast_gamma
  - filter: rotate
    angle: 90
  - filter: grayscale
    method: average
  - filter: binarize
"#;

    #[test]
    fn test_parse_with_defaults() {
        let recipe = Recipe::from_yaml_str(EDITOR_RECIPE).unwrap();
        assert_eq!(recipe.steps.len(), 5);
        assert_eq!(recipe.steps[1], Step::ContrastGamma { gamma: 1.0 });
        assert_eq!(
            recipe.steps[2],
            Step::Rotate {
                angle: 90.0,
                expand: true,
                fill: Fill::Gray(0),
            }
        );
        assert_eq!(
            recipe.steps[3],
            Step::Grayscale {
                method: GrayMethod::Average
            }
        );
        assert_eq!(recipe.steps[4], Step::Binarize { threshold: 128 });
    }

    #[test]
    fn test_parse_fill_and_tags() {
        let yaml = r#"
steps:
  - filter: rotate
    angle: 15
    expand: false
    fill: [1, 2, 3]
  - filter: suppress_cmyk
    channel: K
  - filter: contrast_exp
  - filter: zoom
    x1: 0
    y1: 0
    x2: 4
    y2: 4
    resample: lanczos3
"#;
        let recipe = Recipe::from_yaml_str(yaml).unwrap();
        assert!(matches!(
            recipe.steps[0],
            Step::Rotate {
                expand: false,
                fill: Fill::Rgb([1, 2, 3]),
                ..
            }
        ));
        assert_eq!(
            recipe.steps[1],
            Step::SuppressCmyk {
                channel: CmykChannel::Key
            }
        );
        assert_eq!(recipe.steps[2], Step::ContrastExp { k: 0.01 });
        assert!(matches!(
            recipe.steps[3],
            Step::Zoom {
                scale,
                resample: Resample::Lanczos3,
                ..
            } if scale == 2.0
        ));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let bad_tag = "steps:\n  - filter: suppress_cmyk\n    channel: q\n";
        assert!(matches!(
            Recipe::from_yaml_str(bad_tag),
            Err(RecipeError::Yaml(_))
        ));
        let unknown = "steps:\n  - filter: sharpen\n";
        assert!(Recipe::from_yaml_str(unknown).is_err());
    }

    #[test]
    fn test_apply_replays_in_order() {
        let recipe = Recipe::from_yaml_str(EDITOR_RECIPE).unwrap();
        let img = PixelBuffer::from_fn(4, 2, ColorModel::Rgb, |x, _| {
            let v = if x < 2 { 40 } else { 200 };
            [v, v, v, 0]
        })
        .unwrap();

        let out = recipe.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (2, 4));
        assert_eq!(out.model(), ColorModel::Grayscale);
        // Right half (200 + 20) rotates to the top
        assert_eq!(out.row(0), &[255, 255]);
        assert_eq!(out.row(3), &[0, 0]);
        // Original untouched
        assert_eq!(img.pixel(0, 0), &[40, 40, 40]);
    }

    #[test]
    fn test_apply_reports_failing_step() {
        let mut recipe = Recipe::default();
        recipe
            .push(Step::Invert)
            .push(Step::ContrastGamma { gamma: -2.0 });
        let img = PixelBuffer::filled(1, 1, ColorModel::Grayscale, &[0]).unwrap();
        let err = recipe.apply(&img).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::Ops {
                index: 1,
                filter: "contrast_gamma",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_recipe_is_identity() {
        let img = PixelBuffer::filled(3, 3, ColorModel::Rgb, &[1, 2, 3]).unwrap();
        let recipe = Recipe::from_yaml_str("steps: []").unwrap();
        assert!(recipe.is_empty());
        assert_eq!(recipe.apply(&img).unwrap(), img);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let recipe = Recipe::new(vec![
            Step::ContrastLog { c: None },
            Step::SuppressCmyk {
                channel: CmykChannel::Yellow,
            },
            Step::Rotate {
                angle: 45.0,
                expand: false,
                fill: Fill::Rgb([9, 8, 7]),
            },
        ]);
        let yaml = recipe.to_yaml_string().unwrap();
        assert_eq!(Recipe::from_yaml_str(&yaml).unwrap(), recipe);
    }
}
