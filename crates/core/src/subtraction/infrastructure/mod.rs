pub mod adaptive_background_learning;
pub mod adaptive_selective_background_learning;
pub mod algorithm_factory;
pub mod frame_difference;
pub mod pixel_ops;
pub mod static_frame_difference;
pub mod threshold_config;
pub mod weighted_moving_mean;
pub mod weighted_moving_variance;
mod weighted_window;
