use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::subtraction::infrastructure::pixel_ops::to_gray;
use crate::video::domain::frame_reader::FrameReader;

/// How decoded images are presented to the algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Single-channel intensity.
    Gray,
    /// Three-channel RGB.
    Rgb,
}

impl ColorMode {
    pub fn channels(self) -> u8 {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Rgb => 3,
        }
    }
}

/// Adapts a directory of image files to the [`FrameReader`] interface.
///
/// Files are filtered by extension (case-insensitive) and ordered by path,
/// so `frame_0001.png` precedes `frame_0002.png`. Each file is decoded
/// lazily as the iterator advances.
pub struct ImageSequenceReader {
    extension: String,
    mode: ColorMode,
    files: Vec<PathBuf>,
    opened: bool,
}

impl ImageSequenceReader {
    pub fn new(extension: &str, mode: ColorMode) -> Self {
        Self {
            extension: normalize_extension(extension),
            mode,
            files: Vec::new(),
            opened: false,
        }
    }

    /// Files found by the last [`open`](FrameReader::open), in frame order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// Regular files in `dir` with the given extension, sorted by path.
pub fn list_images(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let wanted = normalize_extension(extension);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_lowercase() == wanted);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decodes one image file into a frame with the requested channel layout.
///
/// Colour sources are reduced to intensity with the same luminance weights
/// the algorithms use.
pub fn decode_image(
    path: &Path,
    mode: ColorMode,
    index: usize,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?;
    let (width, height) = (img.width(), img.height());
    let is_gray_source = img.color().channel_count() <= 2;

    let frame = match (mode, is_gray_source) {
        (ColorMode::Gray, true) => Frame::new(img.to_luma8().into_raw(), width, height, 1, index),
        (ColorMode::Gray, false) => {
            let rgb = Frame::new(img.to_rgb8().into_raw(), width, height, 3, index);
            to_gray(&rgb)
        }
        (ColorMode::Rgb, _) => Frame::new(img.to_rgb8().into_raw(), width, height, 3, index),
    };
    Ok(frame)
}

impl FrameReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>> {
        if !path.is_dir() {
            return Err(format!("Not a directory: {}", path.display()).into());
        }
        self.files = list_images(path, &self.extension)?;
        self.opened = true;

        let (width, height) = match self.files.first() {
            Some(first) => image::image_dimensions(first)?,
            None => (0, 0),
        };
        log::debug!(
            "Found {} '.{}' files in {}",
            self.files.len(),
            self.extension,
            path.display()
        );

        Ok(SequenceMetadata {
            width,
            height,
            channels: self.mode.channels(),
            total_frames: self.files.len(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err(
                "ImageSequenceReader: not opened".into()
            )));
        }
        let mode = self.mode;
        Box::new(
            self.files
                .iter()
                .enumerate()
                .map(move |(index, path)| decode_image(path, mode, index)),
        )
    }

    fn frame_name(&self, index: usize) -> Option<String> {
        self.files
            .get(index)
            .and_then(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
    }

    fn close(&mut self) {
        self.files.clear();
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_gray(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let path = dir.join(name);
        let img = image::GrayImage::from_pixel(width, height, image::Luma([value]));
        img.save(&path).unwrap();
        path
    }

    fn write_rgb(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb(rgb));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(dir.path(), "a.png", 8, 6, 10);
        write_gray(dir.path(), "b.png", 8, 6, 20);
        let mut reader = ImageSequenceReader::new("png", ColorMode::Gray);
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.width, 8);
        assert_eq!(meta.height, 6);
        assert_eq!(meta.channels, 1);
        assert_eq!(meta.total_frames, 2);
        assert_eq!(meta.source_path, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_frames_are_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(dir.path(), "frame_0002.png", 2, 2, 20);
        write_gray(dir.path(), "frame_0001.png", 2, 2, 10);
        write_gray(dir.path(), "frame_0003.png", 2, 2, 30);
        let mut reader = ImageSequenceReader::new(".png", ColorMode::Gray);
        reader.open(dir.path()).unwrap();

        let values: Vec<(usize, u8)> = reader
            .frames()
            .map(|f| {
                let f = f.unwrap();
                (f.index(), f.data()[0])
            })
            .collect();
        assert_eq!(values, vec![(0, 10), (1, 20), (2, 30)]);
        assert_eq!(reader.frame_name(0).as_deref(), Some("frame_0001"));
        assert_eq!(reader.frame_name(3), None);
    }

    #[test]
    fn test_extension_filter_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(dir.path(), "a.png", 2, 2, 1);
        write_gray(dir.path(), "b.bmp", 2, 2, 1);
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = list_images(dir.path(), "PNG").unwrap();
        assert_eq!(files, vec![dir.path().join("a.png")]);
    }

    #[test]
    fn test_rgb_mode_keeps_colour() {
        let dir = tempfile::tempdir().unwrap();
        write_rgb(dir.path(), "c.png", [50, 100, 200]);
        let mut reader = ImageSequenceReader::new("png", ColorMode::Rgb);
        reader.open(dir.path()).unwrap();
        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_gray_mode_converts_colour_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rgb(dir.path(), "c.png", [255, 0, 0]);
        let frame = decode_image(&path, ColorMode::Gray, 4).unwrap();
        assert_eq!(frame.channels(), 1);
        assert_eq!(frame.index(), 4);
        assert!(frame.data().iter().all(|&v| v == 76));
    }

    #[test]
    fn test_empty_directory_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = ImageSequenceReader::new("png", ColorMode::Gray);
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, 0);
        assert_eq!(reader.frames().count(), 0);
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let mut reader = ImageSequenceReader::new("png", ColorMode::Gray);
        assert!(reader.open(Path::new("/nonexistent/frames")).is_err());
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageSequenceReader::new("png", ColorMode::Gray);
        let result = reader.frames().next().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(dir.path(), "a.png", 2, 2, 1);
        let mut reader = ImageSequenceReader::new("png", ColorMode::Gray);
        reader.open(dir.path()).unwrap();
        reader.close();
        reader.close();
        assert!(reader.files().is_empty());
    }
}
