use std::path::PathBuf;

/// Describes an opened frame sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceMetadata {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}
