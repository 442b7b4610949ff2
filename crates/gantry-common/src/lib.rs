#![warn(missing_docs)]

//! Common types shared by the gantry crates.

#[macro_use]
extern crate derive_new;

/// Device reference module.
pub mod device;
/// Device-count specification module.
pub mod devices;
/// Process rank module.
pub mod rank;

pub use device::{DeviceKind, DeviceParseError, DeviceRef, DeviceStats};
pub use devices::Devices;
