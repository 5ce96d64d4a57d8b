//! Per-pixel primitives shared by the subtraction algorithms.
//!
//! Integer luminance, rounding and threshold semantics follow the usual
//! computer-vision conventions exactly; the algorithms' masks depend on them.

use ndarray::Array3;

use crate::shared::constants::{BACKGROUND, FOREGROUND};
use crate::shared::frame::Frame;

/// Fixed-point luminance weights (2^14 scale) for R, G and B.
const GRAY_R: u32 = 4899;
const GRAY_G: u32 = 9617;
const GRAY_B: u32 = 1868;
const GRAY_SHIFT: u32 = 14;
const GRAY_ROUND: u32 = 1 << (GRAY_SHIFT - 1);

/// Converts a 3-channel RGB frame to intensity. Single-channel frames are cloned.
pub fn to_gray(frame: &Frame) -> Frame {
    if frame.channels() == 1 {
        return frame.clone();
    }
    let data: Vec<u8> = frame
        .data()
        .chunks_exact(3)
        .map(|px| {
            let y = px[0] as u32 * GRAY_R + px[1] as u32 * GRAY_G + px[2] as u32 * GRAY_B;
            ((y + GRAY_ROUND) >> GRAY_SHIFT) as u8
        })
        .collect();
    Frame::new(data, frame.width(), frame.height(), 1, frame.index())
}

/// Per-sample `|a - b|`. Both frames must share geometry; the result takes `a`'s index.
pub fn abs_diff(a: &Frame, b: &Frame) -> Frame {
    debug_assert_eq!(a.dims(), b.dims());
    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| x.abs_diff(y))
        .collect();
    Frame::new(data, a.width(), a.height(), a.channels(), a.index())
}

/// Binary threshold in place: samples strictly above `threshold` become 255, others 0.
pub fn threshold_binary(frame: &mut Frame, threshold: i32) {
    for v in frame.data_mut() {
        *v = if i32::from(*v) > threshold {
            FOREGROUND
        } else {
            BACKGROUND
        };
    }
}

/// Collapses a difference image to one channel and optionally binarises it.
pub fn foreground_mask(diff: Frame, threshold: Option<i32>) -> Frame {
    let mut mask = if diff.channels() == 1 {
        diff
    } else {
        to_gray(&diff)
    };
    if let Some(t) = threshold {
        threshold_binary(&mut mask, t);
    }
    mask
}

/// 3x3 median over a single-channel frame, replicating border pixels.
pub fn median_blur_3x3(frame: &Frame) -> Frame {
    debug_assert_eq!(frame.channels(), 1);
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    let src = frame.data();
    let mut out = vec![0u8; w * h];
    let mut window = [0u8; 9];

    for y in 0..h {
        for x in 0..w {
            let mut n = 0;
            for dy in [-1isize, 0, 1] {
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                for dx in [-1isize, 0, 1] {
                    let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                    window[n] = src[sy * w + sx];
                    n += 1;
                }
            }
            window.sort_unstable();
            out[y * w + x] = window[4];
        }
    }
    Frame::new(out, frame.width(), frame.height(), 1, frame.index())
}

/// 8-bit samples scaled to `[0, 1]`, shaped `(height, width, channels)`.
pub fn to_unit(frame: &Frame) -> Array3<f32> {
    frame.as_ndarray().mapv(|v| f32::from(v) * (1.0 / 255.0))
}

/// Inverse of [`to_unit`]: scales by 255, rounds half to even, saturates.
pub fn from_unit(values: &Array3<f32>, index: usize) -> Frame {
    let (h, w, c) = values.dim();
    let data: Vec<u8> = values.iter().map(|&v| saturate_u8(v * 255.0)).collect();
    Frame::new(data, w as u32, h as u32, c as u8, index)
}

/// Rounds half to even and clamps to `[0, 255]`. NaN maps to 0.
pub fn saturate_u8(v: f32) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}
