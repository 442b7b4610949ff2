use gantry_common::{DeviceRef, DeviceStats, Devices};

use crate::ConfigurationError;

/// Capability descriptor for one kind of compute backend.
///
/// An orchestrator selects one accelerator per training run, usually through the
/// [registry](crate::registry::AcceleratorRegistry), and queries it while setting the run up:
/// to validate the root device, to expand the user's `devices` flag into concrete
/// [device references](DeviceRef), and to report availability and statistics.
///
/// Accelerators are stateless descriptors. Every method is cheap, never blocks and may be
/// called concurrently from any thread.
pub trait Accelerator: Send + Sync + core::fmt::Debug + 'static {
    /// Validate that the root device of the run can be driven by this accelerator.
    ///
    /// Implementations that override this method must call [setup_environment_base] first.
    fn setup_environment(&self, root_device: &DeviceRef) -> Result<(), ConfigurationError> {
        setup_environment_base(self, root_device)
    }

    /// Current utilization statistics of the given device.
    ///
    /// Backends without statistics return an empty map.
    fn get_device_stats(&self, device: &DeviceRef) -> DeviceStats;

    /// Release whatever the accelerator acquired during the run.
    fn teardown(&self) {}

    /// Normalize the user's device specification for this backend.
    fn parse_devices(&self, devices: Devices) -> Devices;

    /// Expand a parsed device specification into the devices used for parallel execution.
    ///
    /// Shapes the backend doesn't understand produce a diagnostic and an empty list, leaving
    /// the caller responsible for halting the setup.
    fn get_parallel_devices(&self, devices: &Devices) -> Vec<DeviceRef>;

    /// The number of devices to use when the user asks for `"auto"`.
    fn auto_device_count(&self) -> usize;

    /// Whether the backend can be used on this machine.
    fn is_available(&self) -> bool;

    /// Stable identifier of the backend, used as registry key and in user configuration.
    fn name(&self) -> &'static str;
}

/// Validation shared by every accelerator, run before any backend-specific check.
pub fn setup_environment_base<A: Accelerator + ?Sized>(
    accelerator: &A,
    root_device: &DeviceRef,
) -> Result<(), ConfigurationError> {
    log::debug!(
        "Setting up the `{}` accelerator with root device `{root_device}`",
        accelerator.name()
    );

    Ok(())
}
