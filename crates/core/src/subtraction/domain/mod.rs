pub mod background_subtractor;
pub mod registry;
