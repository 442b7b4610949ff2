/// Accelerator selection config module.
pub mod accelerator;
/// Diagnostics config module.
pub mod diagnostics;

mod base;
mod logger;

pub use accelerator::{AcceleratorConfig, SelectionLogLevel};
pub use base::*;
pub use diagnostics::{DiagnosticsConfig, DiagnosticsLogLevel};
pub use logger::*;
