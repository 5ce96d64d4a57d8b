use thiserror::Error;

use crate::shared::frame::{Frame, FrameDims};
use crate::shared::params::{ParamErrors, ParameterMap};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BgsError {
    #[error("frame is empty")]
    EmptyFrame,
    #[error("unsupported channel count {0}: expected 1 or 3")]
    UnsupportedChannels(u8),
    #[error("frame is {actual} but this instance was initialised with {expected}")]
    DimensionMismatch {
        expected: FrameDims,
        actual: FrameDims,
    },
}

/// Where an algorithm is in its temporal lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtractorState {
    /// No frame seen yet.
    Uninitialized,
    /// Accumulating history; output is not meaningful yet.
    Warming,
    /// Every call produces a mask and an updated model.
    Steady,
}

/// Result of processing one frame.
#[derive(Clone, Debug)]
pub struct BgsOutput {
    /// Single-channel mask, 255 = foreground.
    pub foreground: Frame,
    /// The algorithm's background model after this call.
    pub background: Frame,
    /// False for calls that only initialise or warm up the model.
    pub ready: bool,
}

impl BgsOutput {
    /// Zeroed outputs returned while a model is being initialised: a
    /// single-channel mask and a three-channel background.
    pub fn not_ready(frame: &Frame) -> Self {
        let (w, h, i) = (frame.width(), frame.height(), frame.index());
        Self {
            foreground: Frame::zeros(FrameDims::new(w, h, 1), i),
            background: Frame::zeros(FrameDims::new(w, h, 3), i),
            ready: false,
        }
    }
}

/// Domain interface for background subtraction.
///
/// Implementations keep a running model of the scene and are fed frames in
/// temporal order, hence `&mut self`.
pub trait BackgroundSubtractor: Send {
    /// Canonical registry name of the algorithm.
    fn name(&self) -> &'static str;

    fn process(&mut self, frame: &Frame) -> Result<BgsOutput, BgsError>;

    /// Full recognised parameter set with current values.
    fn params(&self) -> ParameterMap;

    /// Applies every recognised key in `params`. Unknown keys are ignored.
    /// If any value fails to parse nothing is applied.
    fn set_params(&mut self, params: &ParameterMap) -> Result<(), ParamErrors>;

    fn state(&self) -> SubtractorState;
}

/// Locks an instance to the geometry of the first frame it accepts.
#[derive(Clone, Debug, Default)]
pub struct ShapeGuard {
    locked: Option<FrameDims>,
}

impl ShapeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `frame` and, on first success, remembers its geometry.
    pub fn check(&mut self, frame: &Frame) -> Result<(), BgsError> {
        if frame.is_empty() || frame.width() == 0 || frame.height() == 0 {
            return Err(BgsError::EmptyFrame);
        }
        if frame.channels() != 1 && frame.channels() != 3 {
            return Err(BgsError::UnsupportedChannels(frame.channels()));
        }
        let actual = frame.dims();
        match self.locked {
            None => {
                self.locked = Some(actual);
                Ok(())
            }
            Some(expected) if expected == actual => Ok(()),
            Some(expected) => Err(BgsError::DimensionMismatch { expected, actual }),
        }
    }

    pub fn dims(&self) -> Option<FrameDims> {
        self.locked
    }
}
