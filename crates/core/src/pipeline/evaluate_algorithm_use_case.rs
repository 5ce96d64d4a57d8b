use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::evaluation::domain::confusion_matrix::{ConfusionMatrix, EvaluationError};
use crate::pipeline::pipeline_logger::{elapsed_ms, PipelineLogger};
use crate::subtraction::domain::background_subtractor::BackgroundSubtractor;
use crate::video::domain::frame_reader::FrameReader;

/// Scores of one algorithm over one sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub algorithm: String,
    pub frames: usize,
    #[serde(flatten)]
    pub matrix: ConfusionMatrix,
    pub recall: Option<f64>,
    pub precision: Option<f64>,
    pub f_score: Option<f64>,
}

impl EvaluationReport {
    pub fn new(algorithm: &str, frames: usize, matrix: ConfusionMatrix) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            frames,
            matrix,
            recall: matrix.recall(),
            precision: matrix.precision(),
            f_score: matrix.f_score(),
        }
    }
}

/// Runs an algorithm over a frame sequence and scores every mask against
/// the ground-truth mask with the same position in sorted order.
///
/// Warm-up frames count too; their masks are all background.
pub struct EvaluateAlgorithmUseCase {
    frames: Box<dyn FrameReader>,
    ground_truth: Box<dyn FrameReader>,
    subtractor: Box<dyn BackgroundSubtractor>,
    logger: Box<dyn PipelineLogger>,
}

impl EvaluateAlgorithmUseCase {
    pub fn new(
        frames: Box<dyn FrameReader>,
        ground_truth: Box<dyn FrameReader>,
        subtractor: Box<dyn BackgroundSubtractor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            frames,
            ground_truth,
            subtractor,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        frames_dir: &Path,
        ground_truth_dir: &Path,
    ) -> Result<EvaluationReport, Box<dyn std::error::Error>> {
        let frames_meta = self.frames.open(frames_dir)?;
        let truth_meta = self.ground_truth.open(ground_truth_dir)?;
        if frames_meta.total_frames != truth_meta.total_frames {
            return Err(EvaluationError::SequenceLengthMismatch {
                frames: frames_meta.total_frames,
                ground_truth: truth_meta.total_frames,
            }
            .into());
        }

        let total = frames_meta.total_frames;
        self.logger.info(&format!(
            "Evaluating {} on {total} frames from {}",
            self.subtractor.name(),
            frames_dir.display()
        ));

        let mut matrix = ConfusionMatrix::new();
        let mut processed = 0;
        {
            let mut frames = self.frames.frames();
            let mut truths = self.ground_truth.frames();
            loop {
                let t = Instant::now();
                let (frame, truth) = match (frames.next(), truths.next()) {
                    (Some(frame), Some(truth)) => (frame?, truth?),
                    (None, None) => break,
                    _ => {
                        return Err(EvaluationError::SequenceLengthMismatch {
                            frames: frames_meta.total_frames,
                            ground_truth: truth_meta.total_frames,
                        }
                        .into())
                    }
                };
                self.logger.timing("read", elapsed_ms(t));

                let t = Instant::now();
                let output = self.subtractor.process(&frame)?;
                self.logger.timing("process", elapsed_ms(t));

                let t = Instant::now();
                matrix.accumulate(&output.foreground, &truth)?;
                self.logger.timing("score", elapsed_ms(t));

                processed += 1;
                self.logger.progress(processed, total);
            }
        }

        self.frames.close();
        self.ground_truth.close();

        let report = EvaluationReport::new(self.subtractor.name(), processed, matrix);
        log::info!(
            "{}: TP={} FP={} TN={} FN={}",
            report.algorithm,
            matrix.tp,
            matrix.fp,
            matrix.tn,
            matrix.fn_
        );
        self.logger.summary();
        Ok(report)
    }
}
