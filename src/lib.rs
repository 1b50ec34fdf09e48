pub mod charts;
pub mod config;
pub mod error;
pub mod output;
pub mod plot;
