pub mod polar;
pub mod ramp;
pub mod render;
pub mod types;
