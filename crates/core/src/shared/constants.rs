pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "pgm", "ppm"];

pub const DEFAULT_ALGORITHM: &str = "FrameDifference";
pub const DEFAULT_FRAMES_DIR: &str = "frames";
pub const DEFAULT_GROUNDTRUTH_DIR: &str = "groundtruth";
pub const DEFAULT_EXTENSION: &str = "png";

/// Mask value marking a foreground pixel.
pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Suffixes for files written by the subtract pipeline.
pub const MASK_SUFFIX: &str = "_mask";
pub const BACKGROUND_SUFFIX: &str = "_background";
