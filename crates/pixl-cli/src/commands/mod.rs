//! CLI command implementations

pub mod apply;
pub mod blend;
pub mod histogram;

use anyhow::{Context, Result, bail};
use pixl_core::{ImageSource, PixelBuffer, RawSamples, SampleSlice, normalize};
use std::path::Path;

use crate::{Depth, RawArgs};

/// Reads and normalizes a raw sample file.
pub fn load_raw(args: &RawArgs) -> Result<PixelBuffer> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read: {}", args.input.display()))?;
    decode_raw(&bytes, args)
        .with_context(|| format!("Failed to load: {}", args.input.display()))
}

fn raw_source<'a>(args: &RawArgs, samples: SampleSlice<'a>) -> ImageSource<'a> {
    ImageSource::Raw(RawSamples {
        width: args.width,
        height: args.height,
        channels: args.channels,
        samples,
    })
}

fn check_sample_size(len: usize, size: usize) -> Result<()> {
    if len % size != 0 {
        bail!("file size {len} is not a multiple of the {size}-byte sample size");
    }
    Ok(())
}

/// Interprets `bytes` according to `args`.
fn decode_raw(bytes: &[u8], args: &RawArgs) -> Result<PixelBuffer> {
    let img = match args.depth {
        Depth::U8 => normalize(raw_source(args, SampleSlice::U8(bytes)))?,
        Depth::U16 => {
            check_sample_size(bytes.len(), 2)?;
            let samples: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect();
            normalize(raw_source(args, SampleSlice::U16(&samples)))?
        }
        Depth::F32 => {
            check_sample_size(bytes.len(), 4)?;
            let samples: Vec<f32> = bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            normalize(raw_source(args, SampleSlice::F32(&samples)))?
        }
    };
    Ok(img)
}

/// Writes the interleaved u8 samples of `img`.
pub fn save_raw(path: &Path, img: &PixelBuffer) -> Result<()> {
    std::fs::write(path, img.data())
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// One-line description of a buffer for verbose output.
pub fn describe(img: &PixelBuffer) -> String {
    format!("{}x{} {}", img.width(), img.height(), img.model())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixl_core::ColorModel;

    fn args(path: &Path, channels: usize, depth: Depth) -> RawArgs {
        RawArgs {
            input: path.to_path_buf(),
            width: 2,
            height: 1,
            channels,
            depth,
        }
    }

    #[test]
    fn test_load_u8_rgba_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.raw");
        std::fs::write(&path, [1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let img = load_raw(&args(&path, 4, Depth::U8)).unwrap();
        assert_eq!(img.model(), ColorModel::Rgb);
        assert_eq!(img.data(), &[1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_load_u16_and_f32() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("gray16.raw");
        let bytes: Vec<u8> = [100u16, 1000].iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();
        let img = load_raw(&args(&path, 1, Depth::U16)).unwrap();
        assert_eq!(img.data(), &[100, 255]);

        let path = dir.path().join("gray32.raw");
        let bytes: Vec<u8> = [12.7f32, -3.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();
        let img = load_raw(&args(&path, 1, Depth::F32)).unwrap();
        assert_eq!(img.data(), &[12, 0]);
    }

    #[test]
    fn test_load_rejects_bad_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.raw");
        std::fs::write(&path, [0u8; 3]).unwrap();
        assert!(load_raw(&args(&path, 1, Depth::U16)).is_err());
        assert!(load_raw(&args(&path, 3, Depth::U8)).is_err());
        assert!(load_raw(&args(&dir.path().join("missing.raw"), 1, Depth::U8)).is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.raw");
        let img = PixelBuffer::from_data(2, 1, ColorModel::Grayscale, vec![9, 8]).unwrap();
        save_raw(&path, &img).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9, 8]);
        assert_eq!(describe(&img), "2x1 grayscale");
    }
}
