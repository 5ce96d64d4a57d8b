use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes masks and background models with the `image` crate.
///
/// Single-channel frames are saved as grayscale and three-channel frames
/// as RGB. The output format follows the file extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (width, height) = (frame.width(), frame.height());
        match frame.channels() {
            1 => image::GrayImage::from_raw(width, height, frame.data().to_vec())
                .ok_or("Failed to create grayscale image from frame data")?
                .save(path)?,
            3 => image::RgbImage::from_raw(width, height, frame.data().to_vec())
                .ok_or("Failed to create RGB image from frame data")?
                .save(path)?,
            n => return Err(format!("Unsupported channel count for image output: {n}").into()),
        }
        Ok(())
    }
}
