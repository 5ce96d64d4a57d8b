use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::pipeline_logger::{elapsed_ms, PipelineLogger};
use crate::shared::constants::{BACKGROUND_SUFFIX, DEFAULT_EXTENSION, FOREGROUND, MASK_SUFFIX};
use crate::shared::frame::Frame;
use crate::subtraction::domain::background_subtractor::BackgroundSubtractor;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::domain::image_writer::ImageWriter;

/// Counts reported after a subtraction run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubtractionSummary {
    pub frames: usize,
    /// Frames whose mask came from a warmed-up model.
    pub ready_frames: usize,
    pub files_written: usize,
}

/// Streams a frame sequence through one algorithm and writes each mask, and
/// optionally each background model, to an output directory.
///
/// Outputs are named after the source frame: `frame_0001.png` produces
/// `frame_0001_mask.png` and `frame_0001_background.png`.
pub struct SubtractSequenceUseCase {
    reader: Box<dyn FrameReader>,
    writer: Box<dyn ImageWriter>,
    subtractor: Box<dyn BackgroundSubtractor>,
    logger: Box<dyn PipelineLogger>,
    save_background: bool,
    extension: String,
}

impl SubtractSequenceUseCase {
    pub fn new(
        reader: Box<dyn FrameReader>,
        writer: Box<dyn ImageWriter>,
        subtractor: Box<dyn BackgroundSubtractor>,
        logger: Box<dyn PipelineLogger>,
        save_background: bool,
    ) -> Self {
        Self {
            reader,
            writer,
            subtractor,
            logger,
            save_background,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Output image format, by extension. Defaults to png.
    pub fn with_output_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn execute(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<SubtractionSummary, Box<dyn std::error::Error>> {
        let metadata = self.reader.open(input_dir)?;
        let total = metadata.total_frames;
        let stems: Vec<String> = (0..total)
            .map(|i| self.reader.frame_name(i).unwrap_or_else(|| format!("{i:06}")))
            .collect();
        self.logger.info(&format!(
            "Running {} on {total} frames from {}",
            self.subtractor.name(),
            input_dir.display()
        ));

        let mut summary = SubtractionSummary::default();
        {
            let mut frames = self.reader.frames();
            loop {
                let t = Instant::now();
                let Some(frame) = frames.next() else { break };
                let frame = frame?;
                self.logger.timing("read", elapsed_ms(t));

                let t = Instant::now();
                let output = self.subtractor.process(&frame)?;
                self.logger.timing("process", elapsed_ms(t));
                if output.ready {
                    summary.ready_frames += 1;
                    self.logger
                        .metric("foreground_fraction", foreground_fraction(&output.foreground));
                }

                let stem = stems
                    .get(frame.index())
                    .cloned()
                    .unwrap_or_else(|| format!("{:06}", frame.index()));
                let t = Instant::now();
                let mask_path = output_path(output_dir, &stem, MASK_SUFFIX, &self.extension);
                self.writer.write(&mask_path, &output.foreground)?;
                summary.files_written += 1;
                if self.save_background {
                    let bg_path = output_path(output_dir, &stem, BACKGROUND_SUFFIX, &self.extension);
                    self.writer.write(&bg_path, &output.background)?;
                    summary.files_written += 1;
                }
                self.logger.timing("write", elapsed_ms(t));

                summary.frames += 1;
                self.logger.progress(summary.frames, total);
            }
        }
        self.reader.close();

        log::info!(
            "Wrote {} files for {} frames ({} with a ready model) to {}",
            summary.files_written,
            summary.frames,
            summary.ready_frames,
            output_dir.display()
        );
        self.logger.summary();
        Ok(summary)
    }
}

fn output_path(dir: &Path, stem: &str, suffix: &str, extension: &str) -> PathBuf {
    dir.join(format!("{stem}{suffix}.{extension}"))
}

/// Share of mask pixels marked foreground.
fn foreground_fraction(mask: &Frame) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    let on = mask.data().iter().filter(|&&v| v == FOREGROUND).count();
    on as f64 / mask.data().len() as f64
}
