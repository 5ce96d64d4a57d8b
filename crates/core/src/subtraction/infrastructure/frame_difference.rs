use crate::shared::frame::Frame;
use crate::shared::params::{ParamErrors, ParamReader, ParameterMap};
use crate::subtraction::domain::background_subtractor::{
    BackgroundSubtractor, BgsError, BgsOutput, ShapeGuard, SubtractorState,
};

use super::pixel_ops::{abs_diff, foreground_mask};
use super::threshold_config::ThresholdConfig;

pub const NAME: &str = "FrameDifference";

/// Foreground is the difference against the immediately preceding frame.
///
/// The model is the previous input, replaced wholesale on every call. The
/// first call only stores the frame.
pub struct FrameDifference {
    config: ThresholdConfig,
    guard: ShapeGuard,
    background: Option<Frame>,
}

impl FrameDifference {
    pub fn new() -> Self {
        Self {
            config: ThresholdConfig::default(),
            guard: ShapeGuard::new(),
            background: None,
        }
    }
}

impl Default for FrameDifference {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundSubtractor for FrameDifference {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, frame: &Frame) -> Result<BgsOutput, BgsError> {
        self.guard.check(frame)?;

        let Some(background) = &self.background else {
            log::debug!("{NAME}: background initialised from frame {}", frame.index());
            self.background = Some(frame.clone());
            return Ok(BgsOutput::not_ready(frame));
        };

        let foreground = foreground_mask(abs_diff(frame, background), self.config.active());
        self.background = Some(frame.clone());

        Ok(BgsOutput {
            foreground,
            background: frame.clone(),
            ready: true,
        })
    }

    fn params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        self.config.write(&mut params);
        params
    }

    fn set_params(&mut self, params: &ParameterMap) -> Result<(), ParamErrors> {
        let mut next = self.config;
        let mut reader = ParamReader::new(params);
        next.read(&mut reader);
        reader.finish()?;
        self.config = next;
        Ok(())
    }

    fn state(&self) -> SubtractorState {
        if self.background.is_some() {
            SubtractorState::Steady
        } else {
            SubtractorState::Uninitialized
        }
    }
}
