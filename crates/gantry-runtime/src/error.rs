use gantry_common::{DeviceKind, DeviceRef, Devices};
use thiserror::Error;

/// Error that aborts the setup of a training run.
///
/// These errors are fatal and are returned to the orchestrator unmodified.
#[derive(Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The root device doesn't belong to the backend of the accelerator validating it.
    #[error("Device should be {}, got `{device}` instead.", .expected.as_str().to_ascii_uppercase())]
    DeviceMismatch {
        /// The device kind the accelerator drives.
        expected: DeviceKind,
        /// The device that was requested.
        device: DeviceRef,
    },

    /// No accelerator is registered under the requested name.
    #[error("Accelerator `{name}` is not registered\n  Available accelerators: {available:?}")]
    UnknownAccelerator {
        /// The requested name.
        name: String,
        /// The names that are registered.
        available: Vec<String>,
    },

    /// The accelerator is registered but can't run on this machine.
    #[error("Accelerator `{name}` is not available on this machine")]
    Unavailable {
        /// The accelerator name.
        name: String,
    },

    /// The device specification expanded to no device at all.
    #[error("Accelerator `{accelerator}` selected no device for `devices={devices}`")]
    NoDevices {
        /// The accelerator name.
        accelerator: String,
        /// The device specification, after parsing.
        devices: Devices,
    },

    /// Another accelerator is already registered under the same name.
    #[error("Accelerator `{name}` is already registered")]
    AlreadyRegistered {
        /// The accelerator name.
        name: String,
    },
}

impl core::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
