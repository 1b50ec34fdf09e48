//! Chart definitions. Each chart is a configuration value plus a `render`
//! function built on the shared `plot` components.

pub mod conference;
pub mod phases;
