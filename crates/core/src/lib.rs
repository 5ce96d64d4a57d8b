pub mod evaluation;
pub mod pipeline;
pub mod shared;
pub mod subtraction;
pub mod video;
