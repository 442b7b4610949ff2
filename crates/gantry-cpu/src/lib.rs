#![warn(missing_docs)]

//! CPU accelerator for gantry.

mod accelerator;

pub use accelerator::CpuAccelerator;
