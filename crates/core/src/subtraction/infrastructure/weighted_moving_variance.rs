use ndarray::Array3;

use crate::shared::frame::Frame;
use crate::shared::params::{ParamErrors, ParameterMap};
use crate::subtraction::domain::background_subtractor::{
    BackgroundSubtractor, BgsError, BgsOutput, ShapeGuard, SubtractorState,
};

use super::pixel_ops::{foreground_mask, from_unit, to_unit};
use super::weighted_window::{combine, FrameHistory, WindowConfig};

pub const NAME: &str = "WeightedMovingVariance";

/// Foreground is the weighted standard deviation of the last three frames.
///
/// Each frame's squared deviation from the weighted mean is combined with the
/// same weights; the square root, scaled to 8 bits, is the mask. The returned
/// background is the weighted mean.
pub struct WeightedMovingVariance {
    config: WindowConfig,
    guard: ShapeGuard,
    history: FrameHistory,
}

impl WeightedMovingVariance {
    pub fn new() -> Self {
        Self {
            config: WindowConfig::default(),
            guard: ShapeGuard::new(),
            history: FrameHistory::new(),
        }
    }
}

impl Default for WeightedMovingVariance {
    fn default() -> Self {
        Self::new()
    }
}

fn squared_deviation(x: &Array3<f32>, mean: &Array3<f32>) -> Array3<f32> {
    (x - mean).mapv(|d| d * d)
}

impl BackgroundSubtractor for WeightedMovingVariance {
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

        let weighted = self.config.enable_weight;
        let cur_f = to_unit(frame);
        let prev1_f = to_unit(prev1);
        let prev2_f = to_unit(prev2);

        let mean_f = combine(&cur_f, &prev1_f, &prev2_f, weighted);
        let variance_f = combine(
            &squared_deviation(&cur_f, &mean_f),
            &squared_deviation(&prev1_f, &mean_f),
            &squared_deviation(&prev2_f, &mean_f),
            weighted,
        );
        let std_dev = from_unit(&variance_f.mapv(f32::sqrt), frame.index());

        let foreground = foreground_mask(std_dev, self.config.threshold.active());
        let background = from_unit(&mean_f, frame.index());

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::FrameDims;
    use crate::shared::params::param_map;

    fn gray(value: u8, index: usize) -> Frame {
        Frame::filled(FrameDims::new(3, 3, 1), value, index)
    }

    fn raw(weighted: bool) -> WeightedMovingVariance {
        let mut algo = WeightedMovingVariance::new();
        algo.set_params(&param_map([
            ("enableThreshold", "false"),
            ("enableWeight", if weighted { "true" } else { "false" }),
        ]))
        .unwrap();
        algo
    }

    #[test]
    fn test_default_params() {
        let algo = WeightedMovingVariance::new();
        assert_eq!(
            algo.params(),
            param_map([
                ("enableWeight", "true"),
                ("enableThreshold", "true"),
                ("threshold", "15"),
            ])
        );
    }

    #[test]
    fn test_warm_up_then_steady() {
        let mut algo = WeightedMovingVariance::new();
        assert!(!algo.process(&gray(5, 0)).unwrap().ready);
        assert!(!algo.process(&gray(5, 1)).unwrap().ready);
        let out = algo.process(&gray(5, 2)).unwrap();
        assert!(out.ready);
        assert_eq!(out.foreground.dims(), FrameDims::new(3, 3, 1));
    }

    #[test]
    fn test_static_scene_has_zero_deviation() {
        let mut algo = raw(true);
        for i in 0..5 {
            let out = algo.process(&gray(120, i)).unwrap();
            assert!(out.foreground.data().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_weighted_deviation() {
        let mut algo = raw(true);
        algo.process(&gray(100, 0)).unwrap();
        algo.process(&gray(100, 1)).unwrap();
        let out = algo.process(&gray(200, 2)).unwrap();
        // mean 150; every frame deviates by 50, so the deviation is 50.
        assert!(out.background.data().iter().all(|&v| v == 150));
        assert!(out.foreground.data().iter().all(|&v| v == 50));
    }

    #[test]
    fn test_uniform_deviation() {
        let mut algo = raw(false);
        algo.process(&gray(90, 0)).unwrap();
        algo.process(&gray(120, 1)).unwrap();
        let out = algo.process(&gray(150, 2)).unwrap();
        // sqrt((30^2 + 0 + 30^2) / 3) = sqrt(600) ~ 24.49
        assert!(out.background.data().iter().all(|&v| v == 120));
        assert!(out.foreground.data().iter().all(|&v| v == 24));
    }

    #[test]
    fn test_threshold_binarises_deviation() {
        let mut algo = WeightedMovingVariance::new();
        algo.process(&gray(100, 0)).unwrap();
        algo.process(&gray(100, 1)).unwrap();
        let out = algo.process(&gray(200, 2)).unwrap();
        assert!(out.foreground.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_colour_deviation_reduced_to_one_channel() {
        let mut algo = raw(true);
        let dims = FrameDims::new(1, 1, 3);
        algo.process(&Frame::filled(dims, 100, 0)).unwrap();
        algo.process(&Frame::filled(dims, 100, 1)).unwrap();
        let out = algo.process(&Frame::filled(dims, 200, 2)).unwrap();
        assert_eq!(out.foreground.channels(), 1);
        assert_eq!(out.foreground.data(), &[50]);
        assert_eq!(out.background.channels(), 3);
    }
}
