use serde::Serialize;
use thiserror::Error;

use crate::shared::constants::FOREGROUND;
use crate::shared::frame::{Frame, FrameDims};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("found {frames} frames but {ground_truth} ground-truth masks")]
    SequenceLengthMismatch { frames: usize, ground_truth: usize },
    #[error("mask is {mask} but ground truth is {ground_truth}; both must be single-channel and equal size")]
    ShapeMismatch {
        mask: FrameDims,
        ground_truth: FrameDims,
    },
}

/// Pixel-level TP/FP/TN/FN totals, where a value of 255 is positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub fp: u64,
    pub tn: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one mask/ground-truth pair to the totals.
    pub fn accumulate(&mut self, mask: &Frame, ground_truth: &Frame) -> Result<(), EvaluationError> {
        if mask.channels() != 1 || mask.dims() != ground_truth.dims() {
            return Err(EvaluationError::ShapeMismatch {
                mask: mask.dims(),
                ground_truth: ground_truth.dims(),
            });
        }

        for (&m, &g) in mask.data().iter().zip(ground_truth.data()) {
            match (m == FOREGROUND, g == FOREGROUND) {
                (true, true) => self.tp += 1,
                (true, false) => self.fp += 1,
                (false, false) => self.tn += 1,
                (false, true) => self.fn_ += 1,
            }
        }
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// `TP / (TP + FN)`, or `None` when no positives exist in the ground truth.
    pub fn recall(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// `TP / (TP + FP)`, or `None` when nothing was predicted positive.
    pub fn precision(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Harmonic mean of precision and recall. `None` if either is undefined
    /// or both are zero.
    pub fn f_score(&self) -> Option<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        let sum = p + r;
        (sum > 0.0).then(|| 2.0 * p * r / sum)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}
