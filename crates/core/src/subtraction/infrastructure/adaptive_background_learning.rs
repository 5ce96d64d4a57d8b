use crate::shared::frame::Frame;
use crate::shared::params::{format_float, ParamErrors, ParamReader, ParameterMap};
use crate::subtraction::domain::background_subtractor::{
    BackgroundSubtractor, BgsError, BgsOutput, ShapeGuard, SubtractorState,
};

use super::pixel_ops::{foreground_mask, from_unit, to_unit};
use super::threshold_config::ThresholdConfig;

pub const NAME: &str = "AdaptiveBackgroundLearning";

pub const DEFAULT_ALPHA: f64 = 0.05;
/// `maxLearningFrames` value meaning the model never stops learning.
pub const UNLIMITED_LEARNING_FRAMES: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Config {
    alpha: f64,
    max_learning_frames: i32,
    threshold: ThresholdConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_learning_frames: UNLIMITED_LEARNING_FRAMES,
            threshold: ThresholdConfig::default(),
        }
    }
}

/// Exponential moving average of the input in normalised `[0, 1]` space.
///
/// Formula: `model = alpha * frame + (1 - alpha) * model`, re-quantised to
/// 8 bits after every update. Foreground is measured against the model as it
/// stood before the update. With `maxLearningFrames > 0` the model freezes
/// once that many frames have been learned; `-1` learns forever and any
/// other value never learns.
pub struct AdaptiveBackgroundLearning {
    config: Config,
    guard: ShapeGuard,
    background: Option<Frame>,
    learned_frames: i64,
}

impl AdaptiveBackgroundLearning {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            guard: ShapeGuard::new(),
            background: None,
            learned_frames: 0,
        }
    }

    fn is_bounded(&self) -> bool {
        self.config.max_learning_frames > 0
            && self.learned_frames < i64::from(self.config.max_learning_frames)
    }

    fn is_learning(&self) -> bool {
        self.is_bounded() || self.config.max_learning_frames == UNLIMITED_LEARNING_FRAMES
    }
}

impl Default for AdaptiveBackgroundLearning {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundSubtractor for AdaptiveBackgroundLearning {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, frame: &Frame) -> Result<BgsOutput, BgsError> {
        self.guard.check(frame)?;

        let current = match self.background.take() {
            Some(bg) => bg,
            None => {
                log::debug!("{NAME}: background initialised from frame {}", frame.index());
                frame.clone()
            }
        };

        let input_f = to_unit(frame);
        let background_f = to_unit(&current);
        let diff_f = (&input_f - &background_f).mapv(f32::abs);

        let background = if self.is_learning() {
            let alpha = self.config.alpha as f32;
            let keep = (1.0 - self.config.alpha) as f32;
            let updated = &input_f * alpha + &background_f * keep;

            if self.is_bounded() {
                self.learned_frames += 1;
                if !self.is_bounded() {
                    log::debug!(
                        "{NAME}: learning stopped after {} frames",
                        self.learned_frames
                    );
                }
            }
            from_unit(&updated, frame.index())
        } else {
            current.with_index(frame.index())
        };
        self.background = Some(background.clone());

        let foreground = foreground_mask(
            from_unit(&diff_f, frame.index()),
            self.config.threshold.active(),
        );

        Ok(BgsOutput {
            foreground,
            background,
            ready: true,
        })
    }

    fn params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("alpha".to_string(), format_float(self.config.alpha));
        params.insert(
            "maxLearningFrames".to_string(),
            self.config.max_learning_frames.to_string(),
        );
        self.config.threshold.write(&mut params);
        params
    }

    fn set_params(&mut self, params: &ParameterMap) -> Result<(), ParamErrors> {
        let mut next = self.config;
        let mut reader = ParamReader::new(params);
        reader.read_float("alpha", &mut next.alpha);
        reader.read_int("maxLearningFrames", &mut next.max_learning_frames);
        next.threshold.read(&mut reader);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::FrameDims;
    use crate::shared::params::param_map;

    fn gray(value: u8, index: usize) -> Frame {
        Frame::filled(FrameDims::new(2, 2, 1), value, index)
    }

    fn with_params(pairs: &[(&str, &str)]) -> AdaptiveBackgroundLearning {
        let mut algo = AdaptiveBackgroundLearning::new();
        algo.set_params(&param_map(pairs.iter().copied())).unwrap();
        algo
    }

    #[test]
    fn test_default_params() {
        let algo = AdaptiveBackgroundLearning::new();
        assert_eq!(
            algo.params(),
            param_map([
                ("alpha", "0.050000"),
                ("maxLearningFrames", "-1"),
                ("enableThreshold", "true"),
                ("threshold", "15"),
            ])
        );
    }

    #[test]
    fn test_set_params_round_trip() {
        let algo = with_params(&[
            ("alpha", "0.5"),
            ("maxLearningFrames", "10"),
            ("threshold", "40"),
            ("bogus", "1"),
        ]);
        let params = algo.params();
        assert_eq!(params["alpha"], "0.500000");
        assert_eq!(params["maxLearningFrames"], "10");
        assert_eq!(params["threshold"], "40");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_malformed_values_are_all_reported() {
        let mut algo = AdaptiveBackgroundLearning::new();
        let err = algo
            .set_params(&param_map([("alpha", "fast"), ("maxLearningFrames", "many")]))
            .unwrap_err();
        assert_eq!(err.keys(), vec!["alpha", "maxLearningFrames"]);
        assert_eq!(algo.params()["alpha"], "0.050000");
    }

    #[test]
    fn test_first_frame_produces_empty_mask() {
        let mut algo = AdaptiveBackgroundLearning::new();
        let out = algo.process(&gray(100, 0)).unwrap();
        assert!(out.ready);
        assert!(out.foreground.data().iter().all(|&v| v == 0));
        assert!(out.background.data().iter().all(|&v| v == 100));
    }

    #[test]
    fn test_moving_average_update() {
        let mut algo = AdaptiveBackgroundLearning::new();
        algo.process(&gray(100, 0)).unwrap();
        let out = algo.process(&gray(200, 1)).unwrap();
        // 0.05 * 200 + 0.95 * 100 = 105
        assert!(out.background.data().iter().all(|&v| v == 105));
        // Mask compares against the pre-update model (100).
        assert!(out.foreground.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_mask_uses_model_before_update() {
        let mut algo = with_params(&[("alpha", "1.0"), ("enableThreshold", "false")]);
        algo.process(&gray(10, 0)).unwrap();
        let out = algo.process(&gray(30, 1)).unwrap();
        assert!(out.foreground.data().iter().all(|&v| v == 20));
        assert!(out.background.data().iter().all(|&v| v == 30));
    }

    #[test]
    fn test_model_is_quantised_to_eight_bits() {
        let mut algo = AdaptiveBackgroundLearning::new();
        algo.process(&gray(100, 0)).unwrap();
        // 0.05 * 108 + 0.95 * 100 = 100.4, rounds back to 100.
        for i in 1..5 {
            let out = algo.process(&gray(108, i)).unwrap();
            assert!(out.background.data().iter().all(|&v| v == 100));
        }
    }

    #[test]
    fn test_bounded_learning_freezes_model() {
        let mut algo = with_params(&[("maxLearningFrames", "2")]);
        algo.process(&gray(100, 0)).unwrap();
        let out = algo.process(&gray(200, 1)).unwrap();
        assert!(out.background.data().iter().all(|&v| v == 105));
        for i in 2..5 {
            let out = algo.process(&gray(200, i)).unwrap();
            assert!(out.background.data().iter().all(|&v| v == 105));
            assert!(out.foreground.data().iter().all(|&v| v == 255));
        }
        assert_eq!(algo.learned_frames, 2);
    }

    #[test]
    fn test_zero_learning_frames_never_learns() {
        let mut algo = with_params(&[("maxLearningFrames", "0")]);
        algo.process(&gray(100, 0)).unwrap();
        let out = algo.process(&gray(200, 1)).unwrap();
        assert!(out.background.data().iter().all(|&v| v == 100));
        assert_eq!(algo.learned_frames, 0);
    }

    #[test]
    fn test_unlimited_learning_keeps_converging() {
        let mut algo = with_params(&[("alpha", "0.5")]);
        algo.process(&gray(0, 0)).unwrap();
        let mut last = 0;
        for i in 1..20 {
            last = algo.process(&gray(200, i)).unwrap().background.data()[0];
        }
        assert!(last >= 199, "model stalled at {last}");
    }

    #[test]
    fn test_colour_model_keeps_three_channels() {
        let mut algo = AdaptiveBackgroundLearning::new();
        let dims = FrameDims::new(1, 1, 3);
        algo.process(&Frame::filled(dims, 0, 0)).unwrap();
        let out = algo
            .process(&Frame::new(vec![0, 255, 0], 1, 1, 3, 1))
            .unwrap();
        assert_eq!(out.background.channels(), 3);
        assert_eq!(out.foreground.channels(), 1);
        assert_eq!(out.foreground.data(), &[255]);
    }
}
