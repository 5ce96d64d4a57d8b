pub mod evaluate_algorithm_use_case;
pub mod pipeline_logger;
pub mod subtract_sequence_use_case;
