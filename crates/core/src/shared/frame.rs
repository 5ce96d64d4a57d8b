use std::fmt;

use ndarray::{ArrayView3, ArrayViewMut3};

/// Width, height and channel count of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl FrameDims {
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn sample_count(&self) -> usize {
        self.pixel_count() * (self.channels as usize)
    }
}

impl fmt::Display for FrameDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// A single frame of a sequence: 8-bit samples in row-major, interleaved order.
///
/// Frames carry either one channel (intensity) or three (RGB). Masks and
/// background models use the same type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// All-zero frame of the given geometry.
    pub fn zeros(dims: FrameDims, index: usize) -> Self {
        Self::new(
            vec![0u8; dims.sample_count()],
            dims.width,
            dims.height,
            dims.channels,
            index,
        )
    }

    /// Frame filled with a single value in every sample.
    pub fn filled(dims: FrameDims, value: u8, index: usize) -> Self {
        Self::new(
            vec![value; dims.sample_count()],
            dims.width,
            dims.height,
            dims.channels,
            index,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn dims(&self) -> FrameDims {
        FrameDims::new(self.width, self.height, self.channels)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy of this frame carrying a different sequence index.
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert_eq!(frame.dims(), FrameDims::new(2, 2, 3));
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_zeros_and_filled() {
        let dims = FrameDims::new(3, 2, 1);
        assert!(Frame::zeros(dims, 0).data().iter().all(|&v| v == 0));
        let filled = Frame::filled(dims, 7, 4);
        assert_eq!(filled.data().len(), 6);
        assert!(filled.data().iter().all(|&v| v == 7));
        assert_eq!(filled.index(), 4);
    }

    #[test]
    fn test_with_index_keeps_pixels() {
        let frame = Frame::filled(FrameDims::new(2, 2, 1), 9, 0);
        let moved = frame.with_index(3);
        assert_eq!(moved.index(), 3);
        assert_eq!(moved.data(), frame.data());
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(Vec::new(), 0, 0, 1, 0);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_dims_display() {
        assert_eq!(FrameDims::new(640, 480, 3).to_string(), "640x480x3");
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let data = vec![0u8; 4]; // 2x2x1
        let mut frame = Frame::new(data, 2, 2, 1, 0);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[1, 0, 0]] = 128;
        }
        assert_eq!(frame.data()[2], 128);
    }
}
