use ndarray::Array3;

use crate::shared::frame::Frame;
use crate::shared::params::{format_bool, ParamErrors, ParamReader, ParameterMap};
use crate::subtraction::domain::background_subtractor::SubtractorState;

use super::threshold_config::ThresholdConfig;

/// Weights for the current, previous and previous-previous frame.
pub const WINDOW_WEIGHTS: [f32; 3] = [0.5, 0.3, 0.2];

pub const KEY_ENABLE_WEIGHT: &str = "enableWeight";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub enable_weight: bool,
    pub threshold: ThresholdConfig,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            enable_weight: true,
            threshold: ThresholdConfig::default(),
        }
    }
}

impl WindowConfig {
    pub fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert(KEY_ENABLE_WEIGHT.to_string(), format_bool(self.enable_weight));
        self.threshold.write(&mut params);
        params
    }

    /// Returns the updated config, leaving `self` untouched on error.
    pub fn with_params(&self, params: &ParameterMap) -> Result<Self, ParamErrors> {
        let mut next = *self;
        let mut reader = ParamReader::new(params);
        reader.read_bool(KEY_ENABLE_WEIGHT, &mut next.enable_weight);
        next.threshold.read(&mut reader);
        reader.finish()?;
        Ok(next)
    }
}

/// Sliding history of the two frames preceding the current one.
#[derive(Default)]
pub struct FrameHistory {
    prev1: Option<Frame>,
    prev2: Option<Frame>,
    frames_seen: usize,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(previous, previous-previous)` once both are buffered.
    pub fn previous(&self) -> Option<(&Frame, &Frame)> {
        match (&self.prev1, &self.prev2) {
            (Some(p1), Some(p2)) => Some((p1, p2)),
            _ => None,
        }
    }

    /// Shifts the window: current becomes previous, previous becomes previous-previous.
    pub fn push(&mut self, frame: &Frame) {
        self.prev2 = self.prev1.take();
        self.prev1 = Some(frame.clone());
        self.frames_seen = self.frames_seen.saturating_add(1);
    }

    pub fn state(&self) -> SubtractorState {
        match self.frames_seen {
            0 => SubtractorState::Uninitialized,
            1 | 2 => SubtractorState::Warming,
            _ => SubtractorState::Steady,
        }
    }
}

/// `0.5*a + 0.3*b + 0.2*c` when weighted, otherwise the plain mean.
pub fn combine(a: &Array3<f32>, b: &Array3<f32>, c: &Array3<f32>, weighted: bool) -> Array3<f32> {
    if weighted {
        let [wa, wb, wc] = WINDOW_WEIGHTS;
        a * wa + b * wb + c * wc
    } else {
        (a + b + c) / 3.0
    }
}
