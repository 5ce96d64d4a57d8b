use crate::shared::params::{format_bool, ParamReader, ParameterMap};

pub const DEFAULT_THRESHOLD: i32 = 15;

pub const KEY_ENABLE_THRESHOLD: &str = "enableThreshold";
pub const KEY_THRESHOLD: &str = "threshold";

/// `enableThreshold` / `threshold` pair shared by most algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub enabled: bool,
    pub threshold: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    /// Threshold to apply, or `None` when binarisation is disabled.
    pub fn active(&self) -> Option<i32> {
        self.enabled.then_some(self.threshold)
    }

    pub fn read(&mut self, reader: &mut ParamReader<'_>) {
        reader.read_bool(KEY_ENABLE_THRESHOLD, &mut self.enabled);
        reader.read_int(KEY_THRESHOLD, &mut self.threshold);
    }

    pub fn write(&self, params: &mut ParameterMap) {
        params.insert(KEY_ENABLE_THRESHOLD.to_string(), format_bool(self.enabled));
        params.insert(KEY_THRESHOLD.to_string(), self.threshold.to_string());
    }
}
