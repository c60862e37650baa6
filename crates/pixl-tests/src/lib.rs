//! Integration tests for pixl crates.
//!
//! End-to-end checks that run `pixl-core` buffers through `pixl-ops`
//! pipelines and recipe files.

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pixl_core::{
        ColorModel, DecodedImage, DecodedLayout, ImageSource, PixelBuffer, RawSamples,
        SampleSlice, normalize,
    };
    use pixl_ops::{
        BlendParams, CmykChannel, EqualizeMode, Fill, Recipe, RecipeError, Step, binarize, blend,
        blend_equalized, brightness_global, contrast_log, crop, equalize_per_channel, invert,
        match_size, rgb_to_cmyk, rotate, suppress_cmyk_channel,
    };
    use tempfile::tempdir;

    /// Deterministic RGB test pattern.
    fn pattern(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, ColorModel::Rgb, |x, y| {
            [
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
                0,
            ]
        })
        .unwrap()
    }

    fn gray(width: u32, height: u32, data: Vec<u8>) -> PixelBuffer {
        PixelBuffer::from_data(width, height, ColorModel::Grayscale, data).unwrap()
    }

    // ------------------------------------------------------------------
    // Behaviors from the operation contracts
    // ------------------------------------------------------------------

    #[test]
    fn test_brightness_saturates() {
        let img = gray(1, 1, vec![200]);
        let out = brightness_global(&img, 80).unwrap();
        assert_eq!(out.data(), &[255]);
    }

    #[test]
    fn test_log_contrast_default_keeps_white() {
        let img = gray(2, 1, vec![0, 255]);
        let out = contrast_log(&img, None).unwrap();
        assert_eq!(out.data(), &[0, 255]);
    }

    #[test]
    fn test_inverted_crop_clamps_to_single_pixel() {
        let img = pattern(100, 100);
        let out = crop(&img, 10, 10, 5, 5).unwrap();
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.pixel(0, 0), img.pixel(10, 10));
    }

    #[test]
    fn test_rotate_quarter_expanded_swaps_dims() {
        let img = pattern(100, 50);
        let out = rotate(&img, 90.0, true, Fill::default()).unwrap();
        assert_eq!(out.dimensions(), (50, 100));
        assert_eq!(out.model(), ColorModel::Rgb);
    }

    #[test]
    fn test_binarize_threshold_boundary() {
        let img = gray(2, 1, vec![127, 128]);
        let out = binarize(&img, 128).unwrap();
        assert_eq!(out.data(), &[0, 255]);
    }

    #[test]
    fn test_cmyk_white_and_black() {
        let img = PixelBuffer::from_data(2, 1, ColorModel::Rgb, vec![255, 255, 255, 0, 0, 0])
            .unwrap();
        let out = rgb_to_cmyk(&img).unwrap();
        assert_eq!(out.model(), ColorModel::Cmyk);
        assert_eq!(out.pixel(0, 0), &[0, 0, 0, 0]);
        assert_eq!(out.pixel(1, 0), &[0, 0, 0, 255]);
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    #[test]
    fn test_zero_brightness_is_identity() {
        let img = pattern(17, 9);
        assert_eq!(brightness_global(&img, 0).unwrap(), img);
    }

    #[test]
    fn test_invert_is_involution() {
        let img = pattern(13, 11);
        assert_eq!(invert(&invert(&img).unwrap()).unwrap(), img);

        let g = gray(3, 1, vec![0, 77, 255]);
        assert_eq!(invert(&invert(&g).unwrap()).unwrap(), g);
    }

    #[test]
    fn test_binarize_output_is_two_level() {
        let img = pattern(32, 32);
        for threshold in [0u8, 1, 100, 255] {
            let out = binarize(&img, threshold).unwrap();
            assert_eq!(out.model(), ColorModel::Grayscale);
            assert!(out.data().iter().all(|&v| v == 0 || v == 255));
        }
        // Threshold 0 makes everything white
        assert!(binarize(&img, 0).unwrap().data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_crop_dims_and_idempotence() {
        let img = pattern(40, 30);
        let out = crop(&img, 5, 6, 25, 16).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.pixel(0, 0), img.pixel(5, 6));

        let again = crop(&out, 0, 0, 20, 10).unwrap();
        assert_eq!(again, out);

        // Out-of-range corners are clamped to the image
        let clamped = crop(&img, -10, -10, 1000, 1000).unwrap();
        assert_eq!(clamped, img);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = pattern(21, 8);
        assert_eq!(rotate(&img, 0.0, true, Fill::default()).unwrap(), img);
        assert_eq!(rotate(&img, 360.0, false, Fill::default()).unwrap(), img);
    }

    #[test]
    fn test_four_quarter_turns_restore_image() {
        let img = pattern(9, 4);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate(&out, 90.0, true, Fill::default()).unwrap();
        }
        assert_eq!(out, img);
    }

    #[test]
    fn test_match_size_takes_base_dims() {
        let base = pattern(31, 17);
        let other = gray(5, 60, vec![9; 300]);
        let out = match_size(&base, &other).unwrap();
        assert_eq!(out.dimensions(), base.dimensions());
        assert_eq!(out.model(), ColorModel::Grayscale);
        assert!(out.data().iter().all(|&v| v == 9));
    }

    #[test]
    fn test_uniform_histogram_equalizes_to_itself() {
        let img = gray(16, 16, (0..=255).collect());
        let out = equalize_per_channel(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_equalization_is_monotonic() {
        let img = gray(6, 1, vec![3, 3, 40, 41, 200, 90]);
        let out = equalize_per_channel(&img).unwrap();
        let d = out.data();
        assert_eq!(d[0], 0);
        assert_eq!(d[4], 255);
        assert!(d[0] <= d[2] && d[2] <= d[3] && d[3] <= d[5] && d[5] <= d[4]);
    }

    #[test]
    fn test_luma_weights_sum_to_one() {
        let sum = pixl_core::REC709_LUMA.iter().sum::<f64>();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }

    // ------------------------------------------------------------------
    // Normalization
    // ------------------------------------------------------------------

    struct Decoded {
        data: Vec<u8>,
    }

    impl DecodedImage for Decoded {
        fn width(&self) -> u32 {
            2
        }

        fn height(&self) -> u32 {
            1
        }

        fn layout(&self) -> DecodedLayout {
            DecodedLayout::Rgba
        }

        fn samples(&self) -> SampleSlice<'_> {
            SampleSlice::U8(&self.data)
        }
    }

    #[test]
    fn test_normalize_decoded_rgba() {
        let decoded = Decoded {
            data: vec![10, 20, 30, 255, 40, 50, 60, 0],
        };
        let img = normalize(ImageSource::Decoded(&decoded)).unwrap();
        assert_eq!(img.model(), ColorModel::Rgb);
        assert_eq!(img.data(), &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_normalize_gray_alpha_then_process() {
        let samples = [100u8, 255, 200, 0];
        let img = normalize(
            RawSamples {
                width: 2,
                height: 1,
                channels: 2,
                samples: SampleSlice::U8(&samples),
            }
            .into(),
        )
        .unwrap();
        assert_eq!(img.model(), ColorModel::Grayscale);
        assert_eq!(invert(&img).unwrap().data(), &[155, 55]);
    }

    #[test]
    fn test_normalize_rejects_five_channels() {
        let samples = [0u8; 5];
        let err = normalize(
            RawSamples {
                width: 1,
                height: 1,
                channels: 5,
                samples: SampleSlice::U8(&samples),
            }
            .into(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            pixl_core::Error::UnsupportedChannelCount { channels: 5, .. }
        ));
    }

    // ------------------------------------------------------------------
    // Compositing
    // ------------------------------------------------------------------

    #[test]
    fn test_blend_mixed_models_and_sizes() {
        let a = PixelBuffer::filled(6, 4, ColorModel::Rgb, &[200, 100, 0]).unwrap();
        let b = PixelBuffer::filled(3, 2, ColorModel::Grayscale, &[50]).unwrap();
        let out = blend(&a, &b, BlendParams::new(0.5).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (6, 4));
        assert_eq!(out.pixel(5, 3), &[125, 75, 25]);
    }

    #[test]
    fn test_blend_equalized_modes_keep_base_size() {
        let a = gray(4, 1, vec![10, 20, 30, 40]);
        let b = gray(2, 2, vec![5, 5, 250, 250]);
        let params = BlendParams::new(0.75).unwrap();
        let per = blend_equalized(&a, &b, params, EqualizeMode::PerChannel).unwrap();
        let lum = blend_equalized(&a, &b, params, EqualizeMode::Luminance).unwrap();
        assert_eq!(per.dimensions(), (4, 1));
        assert_eq!(lum.dimensions(), (4, 1));
        assert_eq!(per.model(), ColorModel::Rgb);
        assert_eq!(lum.model(), ColorModel::Rgb);
    }

    #[test]
    fn test_suppressed_key_channel() {
        let img = PixelBuffer::filled(2, 2, ColorModel::Rgb, &[128, 128, 128]).unwrap();
        let out = suppress_cmyk_channel(&img, CmykChannel::Key).unwrap();
        assert_eq!(out.model(), ColorModel::Rgb);
        // Without K, a neutral gray reads as white
        assert!(out.data().iter().all(|&v| v == 255));
    }

    // ------------------------------------------------------------------
    // Recipes on disk
    // ------------------------------------------------------------------

    #[test]
    fn test_recipe_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipe.yaml");

        let mut recipe = Recipe::default();
        recipe
            .push(Step::BrightnessGlobal { delta: 10 })
            .push(Step::Rotate {
                angle: 90.0,
                expand: true,
                fill: Fill::Gray(0),
            })
            .push(Step::Invert);
        std::fs::write(&path, recipe.to_yaml_string().unwrap()).unwrap();

        let loaded = Recipe::from_file(&path).unwrap();
        assert_eq!(loaded, recipe);

        let img = pattern(8, 3);
        let out = loaded.apply(&img).unwrap();
        let expected = invert(
            &rotate(
                &brightness_global(&img, 10).unwrap(),
                90.0,
                true,
                Fill::Gray(0),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(out.dimensions(), (3, 8));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_recipe_file_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Recipe::from_file(dir.path().join("missing.yaml")),
            Err(RecipeError::Io(_))
        ));

        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "steps:\n  - filter: contrast_gamma\n    gamma: -1\n").unwrap();
        let recipe = Recipe::from_file(&path).unwrap();
        let err = recipe.apply(&pattern(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::Ops {
                index: 0,
                filter: "contrast_gamma",
                ..
            }
        ));
    }
}
