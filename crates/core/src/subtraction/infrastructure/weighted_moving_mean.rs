use crate::shared::frame::Frame;
use crate::shared::params::{ParamErrors, ParameterMap};
use crate::subtraction::domain::background_subtractor::{
    BackgroundSubtractor, BgsError, BgsOutput, ShapeGuard, SubtractorState,
};

use super::pixel_ops::{abs_diff, foreground_mask, from_unit, to_unit};
use super::weighted_window::{combine, FrameHistory, WindowConfig};

pub const NAME: &str = "WeightedMovingMean";

/// Background is a weighted mean of the last three frames.
///
/// The first two calls only fill the history.
pub struct WeightedMovingMean {
    config: WindowConfig,
    guard: ShapeGuard,
    history: FrameHistory,
}

impl WeightedMovingMean {
    pub fn new() -> Self {
        Self {
            config: WindowConfig::default(),
            guard: ShapeGuard::new(),
            history: FrameHistory::new(),
        }
    }
}

impl Default for WeightedMovingMean {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundSubtractor for WeightedMovingMean {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, frame: &Frame) -> Result<BgsOutput, BgsError> {
        self.guard.check(frame)?;

        let Some((prev1, prev2)) = self.history.previous() else {
            log::debug!("{NAME}: buffering frame {} into history", frame.index());
            self.history.push(frame);
            return Ok(BgsOutput::not_ready(frame));
        };

        let mean_f = combine(
            &to_unit(frame),
            &to_unit(prev1),
            &to_unit(prev2),
            self.config.enable_weight,
        );
        let background = from_unit(&mean_f, frame.index());
        let foreground = foreground_mask(abs_diff(frame, &background), self.config.threshold.active());

        self.history.push(frame);

        Ok(BgsOutput {
            foreground,
            background,
            ready: true,
        })
    }

    fn params(&self) -> ParameterMap {
        self.config.to_params()
    }

    fn set_params(&mut self, params: &ParameterMap) -> Result<(), ParamErrors> {
        self.config = self.config.with_params(params)?;
        Ok(())
    }

    fn state(&self) -> SubtractorState {
        self.history.state()
    }
}
