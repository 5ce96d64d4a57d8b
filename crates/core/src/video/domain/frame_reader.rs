use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;

/// Reads frames of a sequence in temporal order.
///
/// Implementations handle storage and decoding details while the pipeline
/// works with the abstract `Frame` and `SequenceMetadata` types.
pub trait FrameReader: Send {
    /// Opens a sequence and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in temporal order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Name of the frame at `index` without extension, when the source has one.
    fn frame_name(&self, _index: usize) -> Option<String> {
        None
    }

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
