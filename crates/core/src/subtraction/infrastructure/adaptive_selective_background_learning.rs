use ndarray::Zip;

use crate::shared::constants::BACKGROUND;
use crate::shared::frame::Frame;
use crate::shared::params::{format_float, ParamErrors, ParamReader, ParameterMap};
use crate::subtraction::domain::background_subtractor::{
    BackgroundSubtractor, BgsError, BgsOutput, ShapeGuard, SubtractorState,
};

use super::pixel_ops::{from_unit, median_blur_3x3, threshold_binary, to_gray, to_unit};
use super::threshold_config::DEFAULT_THRESHOLD;

pub const NAME: &str = "AdaptiveSelectiveBackgroundLearning";

pub const DEFAULT_ALPHA_LEARN: f64 = 0.05;
pub const DEFAULT_ALPHA_DETECTION: f64 = 0.05;
pub const DEFAULT_LEARNING_FRAMES: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Config {
    alpha_learn: f64,
    alpha_detection: f64,
    learning_frames: i32,
    threshold: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha_learn: DEFAULT_ALPHA_LEARN,
            alpha_detection: DEFAULT_ALPHA_DETECTION,
            learning_frames: DEFAULT_LEARNING_FRAMES,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Intensity moving average that stops learning under detected foreground.
///
/// While `learningFrames > 0 && counter <= learningFrames` every pixel is
/// blended with `alphaLearn`. After that (and always when `learningFrames`
/// is not positive, including `-1`) only pixels whose median-filtered mask
/// is 0 are blended with `alphaDetection`; foreground pixels keep their
/// model value exactly.
pub struct AdaptiveSelectiveBackgroundLearning {
    config: Config,
    guard: ShapeGuard,
    background: Option<Frame>,
    counter: i64,
}

impl AdaptiveSelectiveBackgroundLearning {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            guard: ShapeGuard::new(),
            background: None,
            counter: 0,
        }
    }

    fn in_learning_phase(&self) -> bool {
        self.config.learning_frames > 0 && self.counter <= i64::from(self.config.learning_frames)
    }
}

impl Default for AdaptiveSelectiveBackgroundLearning {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundSubtractor for AdaptiveSelectiveBackgroundLearning {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, frame: &Frame) -> Result<BgsOutput, BgsError> {
        self.guard.check(frame)?;

        let input = to_gray(frame);
        let current = match self.background.take() {
            Some(bg) => bg,
            None => {
                log::debug!("{NAME}: background initialised from frame {}", frame.index());
                input.clone()
            }
        };

        let input_f = to_unit(&input);
        let mut background_f = to_unit(&current);
        let diff_f = (&input_f - &background_f).mapv(f32::abs);

        let mut mask = from_unit(&diff_f, frame.index());
        threshold_binary(&mut mask, self.config.threshold);
        let foreground = median_blur_3x3(&mask);

        if self.in_learning_phase() {
            let alpha = self.config.alpha_learn as f32;
            let keep = (1.0 - self.config.alpha_learn) as f32;
            background_f = &input_f * alpha + &background_f * keep;
            self.counter += 1;
            if !self.in_learning_phase() {
                log::debug!("{NAME}: switching to selective updates at frame {}", frame.index());
            }
        } else {
            let alpha = self.config.alpha_detection as f32;
            let keep = (1.0 - self.config.alpha_detection) as f32;
            Zip::from(&mut background_f)
                .and(&input_f)
                .and(&foreground.as_ndarray())
                .for_each(|bg, &px, &m| {
                    if m == BACKGROUND {
                        *bg = alpha * px + keep * *bg;
                    }
                });
        }

        let background = from_unit(&background_f, frame.index());
        self.background = Some(background.clone());

        Ok(BgsOutput {
            foreground,
            background,
            ready: true,
        })
    }

    fn params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("alphaLearn".to_string(), format_float(self.config.alpha_learn));
        params.insert(
            "alphaDetection".to_string(),
            format_float(self.config.alpha_detection),
        );
        params.insert(
            "learningFrames".to_string(),
            self.config.learning_frames.to_string(),
        );
        params.insert("threshold".to_string(), self.config.threshold.to_string());
        params
    }

    fn set_params(&mut self, params: &ParameterMap) -> Result<(), ParamErrors> {
        let mut next = self.config;
        let mut reader = ParamReader::new(params);
        reader.read_float("alphaLearn", &mut next.alpha_learn);
        reader.read_float("alphaDetection", &mut next.alpha_detection);
        reader.read_int("learningFrames", &mut next.learning_frames);
        reader.read_int("threshold", &mut next.threshold);
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
