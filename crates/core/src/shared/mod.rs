pub mod constants;
pub mod frame;
pub mod params;
pub mod sequence_metadata;
