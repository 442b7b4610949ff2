#![warn(missing_docs)]

//! Gantry runtime crate: the accelerator contract and the pieces an orchestrator uses to pick
//! one.

#[macro_use]
extern crate derive_new;

mod accelerator;
mod error;

/// Accelerator connector module.
pub mod connector;
/// Configuration module.
pub mod config;
/// Process-wide diagnostic channel.
pub mod diagnostics;
/// Accelerator registry module.
pub mod registry;

pub use accelerator::*;
pub use error::*;

pub use gantry_common::{DeviceKind, DeviceParseError, DeviceRef, DeviceStats, Devices, rank};
