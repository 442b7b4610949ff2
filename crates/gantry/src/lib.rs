#![warn(missing_docs)]

//! Accelerator capability layer for training orchestrators.
//!
//! Pick the backend of a run by name, validate its root device and expand the user's `devices`
//! flag into concrete device references:
//!
//! ```
//! use gantry::{AcceleratorConnector, Devices};
//!
//! let selection = AcceleratorConnector::new(gantry::registry())
//!     .connect("cpu", Devices::from(2))
//!     .unwrap();
//!
//! assert_eq!(selection.parallel_devices().len(), 2);
//! ```

pub use gantry_common::*;
pub use gantry_runtime::{
    Accelerator, ConfigurationError, config, connector::*, diagnostics,
    registry::{AcceleratorRegistry, RegistryEntry},
    setup_environment_base,
};

#[cfg(feature = "cpu")]
pub use gantry_cpu::CpuAccelerator;

static REGISTER_BUILTINS: std::sync::Once = std::sync::Once::new();

/// The process-wide registry, with the accelerators enabled by crate features registered.
pub fn registry() -> &'static AcceleratorRegistry {
    let registry = AcceleratorRegistry::global();

    REGISTER_BUILTINS.call_once(|| register_builtins(registry));

    registry
}

/// Select the accelerator described by the global configuration.
pub fn connect_from_config() -> Result<Selection, ConfigurationError> {
    AcceleratorConnector::new(registry()).from_config(&config::GlobalConfig::get())
}

fn register_builtins(registry: &AcceleratorRegistry) {
    #[cfg(feature = "cpu")]
    if let Err(err) = CpuAccelerator::register(registry) {
        log::debug!("Keeping the already registered CPU accelerator: {err}");
    }

    #[cfg(not(feature = "cpu"))]
    let _ = registry;
}
