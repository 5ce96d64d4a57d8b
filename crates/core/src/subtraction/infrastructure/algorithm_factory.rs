use std::fmt;
use std::str::FromStr;

use crate::subtraction::domain::background_subtractor::BackgroundSubtractor;
use crate::subtraction::domain::registry::{Registry, RegistryError};

use super::adaptive_background_learning::{self, AdaptiveBackgroundLearning};
use super::adaptive_selective_background_learning::{self, AdaptiveSelectiveBackgroundLearning};
use super::frame_difference::{self, FrameDifference};
use super::static_frame_difference::{self, StaticFrameDifference};
use super::weighted_moving_mean::{self, WeightedMovingMean};
use super::weighted_moving_variance::{self, WeightedMovingVariance};

/// The built-in background subtraction algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    FrameDifference,
    StaticFrameDifference,
    AdaptiveBackgroundLearning,
    AdaptiveSelectiveBackgroundLearning,
    WeightedMovingMean,
    WeightedMovingVariance,
}

impl AlgorithmKind {
    pub const ALL: &'static [AlgorithmKind] = &[
        AlgorithmKind::FrameDifference,
        AlgorithmKind::StaticFrameDifference,
        AlgorithmKind::AdaptiveBackgroundLearning,
        AlgorithmKind::AdaptiveSelectiveBackgroundLearning,
        AlgorithmKind::WeightedMovingMean,
        AlgorithmKind::WeightedMovingVariance,
    ];

    /// Canonical registry name.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::FrameDifference => frame_difference::NAME,
            AlgorithmKind::StaticFrameDifference => static_frame_difference::NAME,
            AlgorithmKind::AdaptiveBackgroundLearning => adaptive_background_learning::NAME,
            AlgorithmKind::AdaptiveSelectiveBackgroundLearning => {
                adaptive_selective_background_learning::NAME
            }
            AlgorithmKind::WeightedMovingMean => weighted_moving_mean::NAME,
            AlgorithmKind::WeightedMovingVariance => weighted_moving_variance::NAME,
        }
    }

    pub fn create(self) -> Box<dyn BackgroundSubtractor> {
        match self {
            AlgorithmKind::FrameDifference => Box::new(FrameDifference::new()),
            AlgorithmKind::StaticFrameDifference => Box::new(StaticFrameDifference::new()),
            AlgorithmKind::AdaptiveBackgroundLearning => {
                Box::new(AdaptiveBackgroundLearning::new())
            }
            AlgorithmKind::AdaptiveSelectiveBackgroundLearning => {
                Box::new(AdaptiveSelectiveBackgroundLearning::new())
            }
            AlgorithmKind::WeightedMovingMean => Box::new(WeightedMovingMean::new()),
            AlgorithmKind::WeightedMovingVariance => Box::new(WeightedMovingVariance::new()),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RegistryError::UnknownAlgorithm(s.to_string()))
    }
}

/// Registers every built-in algorithm under its canonical name.
pub fn register_builtin(registry: &mut Registry) {
    for &kind in AlgorithmKind::ALL {
        registry.register(kind.name(), move || Ok(kind.create()));
    }
    log::debug!("Registered {} built-in algorithms", AlgorithmKind::ALL.len());
}

impl Registry {
    /// Registry pre-populated with the built-in algorithms.
    pub fn with_builtin() -> Self {
        let mut registry = Registry::new();
        register_builtin(&mut registry);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::{Frame, FrameDims};
    use crate::shared::params::param_map;
    use crate::subtraction::domain::background_subtractor::SubtractorState;
    use rstest::rstest;

    #[test]
    fn test_builtin_registry_lists_all_names() {
        let registry = Registry::with_builtin();
        assert_eq!(
            registry.names(),
            vec![
                "AdaptiveBackgroundLearning",
                "AdaptiveSelectiveBackgroundLearning",
                "FrameDifference",
                "StaticFrameDifference",
                "WeightedMovingMean",
                "WeightedMovingVariance",
            ]
        );
    }

    #[rstest]
    #[case::frame_difference(
        "FrameDifference",
        vec![("enableThreshold", "true"), ("threshold", "15")]
    )]
    #[case::static_frame_difference(
        "StaticFrameDifference",
        vec![("enableThreshold", "true"), ("threshold", "15")]
    )]
    #[case::adaptive(
        "AdaptiveBackgroundLearning",
        vec![
            ("alpha", "0.050000"),
            ("maxLearningFrames", "-1"),
            ("enableThreshold", "true"),
            ("threshold", "15"),
        ]
    )]
    #[case::adaptive_selective(
        "AdaptiveSelectiveBackgroundLearning",
        vec![
            ("alphaLearn", "0.050000"),
            ("alphaDetection", "0.050000"),
            ("learningFrames", "-1"),
            ("threshold", "15"),
        ]
    )]
    #[case::weighted_mean(
        "WeightedMovingMean",
        vec![("enableWeight", "true"), ("enableThreshold", "true"), ("threshold", "15")]
    )]
    #[case::weighted_variance(
        "WeightedMovingVariance",
        vec![("enableWeight", "true"), ("enableThreshold", "true"), ("threshold", "15")]
    )]
    fn test_created_instances_have_default_params(
        #[case] name: &str,
        #[case] expected: Vec<(&str, &str)>,
    ) {
        let registry = Registry::with_builtin();
        let algo = registry.create(name).unwrap();
        assert_eq!(algo.name(), name);
        assert_eq!(algo.state(), SubtractorState::Uninitialized);
        assert_eq!(algo.params(), param_map(expected));
    }

    #[test]
    fn test_set_params_reflects_recognised_keys_only() {
        let registry = Registry::with_builtin();
        for name in registry.names() {
            let mut algo = registry.create(&name).unwrap();
            let defaults = algo.params();
            let mut update = param_map([("notAParameter", "1")]);
            update.insert("threshold".to_string(), "33".to_string());
            algo.set_params(&update).unwrap();

            let params = algo.params();
            assert_eq!(params.len(), defaults.len(), "{name}");
            assert!(!params.contains_key("notAParameter"), "{name}");
            assert_eq!(params["threshold"], "33", "{name}");
        }
    }

    #[test]
    fn test_every_algorithm_processes_colour_and_gray() {
        let registry = Registry::with_builtin();
        for name in registry.names() {
            for channels in [1u8, 3] {
                let mut algo = registry.create(&name).unwrap();
                let dims = FrameDims::new(8, 6, channels);
                let mut out = None;
                for i in 0..4 {
                    out = Some(algo.process(&Frame::filled(dims, 40, i)).unwrap());
                }
                let out = out.unwrap();
                assert!(out.ready, "{name}");
                assert_eq!(out.foreground.dims(), FrameDims::new(8, 6, 1), "{name}");
                assert!(out.foreground.data().iter().all(|&v| v == 0), "{name}");
            }
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for &kind in AlgorithmKind::ALL {
            assert_eq!(kind.name().parse::<AlgorithmKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!("Mog2".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_kind_create_matches_name() {
        for &kind in AlgorithmKind::ALL {
            assert_eq!(kind.create().name(), kind.name());
        }
    }

    #[test]
    fn test_builtin_can_be_overridden() {
        let mut registry = Registry::with_builtin();
        registry.register(frame_difference::NAME, || {
            Ok(AlgorithmKind::StaticFrameDifference.create())
        });
        let algo = registry.create(frame_difference::NAME).unwrap();
        assert_eq!(algo.name(), static_frame_difference::NAME);
        assert_eq!(registry.len(), AlgorithmKind::ALL.len());
    }
}
