//! Row and chunk drivers shared by every per-pixel operation.
//!
//! With the `parallel` feature (default) work is split with rayon's
//! `par_chunks_mut`; without it the same closures run sequentially. The
//! chunking never changes results, only scheduling.
//!
//! # Example
//!
//! ```rust
//! use pixl_ops::parallel::map_lut;
//!
//! let mut lut = [0u8; 256];
//! for (i, v) in lut.iter_mut().enumerate() {
//!     *v = 255 - i as u8;
//! }
//! assert_eq!(map_lut(&[0, 10, 255], &lut), vec![255, 245, 0]);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pixels handed to one task by [`map_pixels`].
const PIXELS_PER_CHUNK: usize = 4096;

/// Maps every sample through a 256-entry lookup table.
pub fn map_lut(src: &[u8], lut: &[u8; 256]) -> Vec<u8> {
    map_pixels(src, 1, 1, |s, d| d[0] = lut[s[0] as usize])
}

/// Maps each channel of interleaved samples through its own table.
///
/// `luts.len()` is the channel count.
pub fn map_channel_luts(src: &[u8], luts: &[[u8; 256]]) -> Vec<u8> {
    let n = luts.len();
    map_pixels(src, n, n, |s, d| {
        for c in 0..n {
            d[c] = luts[c][s[c] as usize];
        }
    })
}

/// Runs `f(src_pixel, dst_pixel)` for every pixel.
///
/// `src` holds `in_ch` samples per pixel, the result `out_ch`.
pub fn map_pixels<F>(src: &[u8], in_ch: usize, out_ch: usize, f: F) -> Vec<u8>
where
    F: Fn(&[u8], &mut [u8]) + Send + Sync,
{
    let pixels = src.len() / in_ch;
    let mut dst = vec![0u8; pixels * out_ch];
    let run = |(s, d): (&[u8], &mut [u8])| {
        for (sp, dp) in s.chunks_exact(in_ch).zip(d.chunks_exact_mut(out_ch)) {
            f(sp, dp);
        }
    };

    #[cfg(feature = "parallel")]
    src.par_chunks(PIXELS_PER_CHUNK * in_ch)
        .zip(dst.par_chunks_mut(PIXELS_PER_CHUNK * out_ch))
        .for_each(run);

    #[cfg(not(feature = "parallel"))]
    src.chunks(PIXELS_PER_CHUNK * in_ch)
        .zip(dst.chunks_mut(PIXELS_PER_CHUNK * out_ch))
        .for_each(run);

    dst
}

/// Fills `dst` row by row with `f(y, row)`.
pub fn fill_rows<T, F>(dst: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}
