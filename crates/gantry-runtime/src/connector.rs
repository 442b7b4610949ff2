use crate::{
    Accelerator, ConfigurationError,
    config::{AcceleratorConfig, GlobalConfig, SelectionLogLevel},
    diagnostics,
    registry::AcceleratorRegistry,
};
use gantry_common::{DeviceRef, DeviceStats, Devices};
use std::sync::Arc;

/// Picks the accelerator of a run and prepares its devices.
///
/// The connector is the orchestrator side of the [Accelerator] contract. Given a backend name
/// and the user's device specification, it:
///
/// 1. resolves the name in the [registry](AcceleratorRegistry), `"auto"` selecting the first
///    available accelerator and preferring anything over `cpu`;
/// 2. parses the device specification, replacing the `"auto"` token with the accelerator's
///    automatic device count;
/// 3. expands it into the devices used for parallel execution, failing when there are none;
/// 4. validates the environment with the first device as root device.
#[derive(new, Debug, Clone, Copy)]
pub struct AcceleratorConnector<'a> {
    registry: &'a AcceleratorRegistry,
}

/// The accelerator and devices selected for a run.
#[derive(Debug, Clone)]
pub struct Selection {
    /// The registry name of the selected accelerator.
    pub name: String,
    /// The selected accelerator.
    pub accelerator: Arc<dyn Accelerator>,
    /// The device specification after parsing and `"auto"` resolution.
    pub devices: Devices,
    // Never empty, the root device comes first.
    parallel_devices: Vec<DeviceRef>,
}

impl Selection {
    /// The device the run is set up on.
    pub fn root_device(&self) -> &DeviceRef {
        &self.parallel_devices[0]
    }

    /// The devices used for parallel execution, root device first.
    pub fn parallel_devices(&self) -> &[DeviceRef] {
        &self.parallel_devices
    }

    /// The number of devices used for parallel execution.
    pub fn num_devices(&self) -> usize {
        self.parallel_devices.len()
    }

    /// Current statistics of the root device.
    pub fn root_device_stats(&self) -> DeviceStats {
        self.accelerator.get_device_stats(self.root_device())
    }

    /// Release what the accelerator acquired for the run.
    pub fn teardown(self) {
        self.accelerator.teardown();
    }
}

impl AcceleratorConnector<'_> {
    /// Select the accelerator and devices described by the configuration.
    pub fn from_config(&self, config: &GlobalConfig) -> Result<Selection, ConfigurationError> {
        self.connect(&config.accelerator.name, config.accelerator.devices.clone())
    }

    /// Select the accelerator registered under `name` and prepare the given devices.
    pub fn connect(
        &self,
        name: &str,
        devices: impl Into<Devices>,
    ) -> Result<Selection, ConfigurationError> {
        let (name, accelerator) = self.resolve(name)?;

        let mut devices = accelerator.parse_devices(devices.into());
        if devices.is_auto() {
            devices = Devices::from(accelerator.auto_device_count());
        }

        let parallel_devices = accelerator.get_parallel_devices(&devices);
        let Some(root_device) = parallel_devices.first() else {
            return Err(ConfigurationError::NoDevices {
                accelerator: name,
                devices,
            });
        };

        accelerator.setup_environment(root_device)?;

        let selection = Selection {
            name,
            accelerator,
            devices,
            parallel_devices,
        };
        self.log_summary(&selection);

        Ok(selection)
    }

    /// Find the accelerator a backend name refers to.
    pub fn resolve(
        &self,
        name: &str,
    ) -> Result<(String, Arc<dyn Accelerator>), ConfigurationError> {
        if name.trim().eq_ignore_ascii_case(AcceleratorConfig::AUTO) {
            return self.resolve_auto();
        }

        let entry = self
            .registry
            .entry(name)
            .ok_or_else(|| ConfigurationError::UnknownAccelerator {
                name: name.to_string(),
                available: self.registry.names(),
            })?;

        if !entry.accelerator.is_available() {
            return Err(ConfigurationError::Unavailable { name: entry.name });
        }

        Ok((entry.name, entry.accelerator))
    }

    fn resolve_auto(&self) -> Result<(String, Arc<dyn Accelerator>), ConfigurationError> {
        let available = self
            .registry
            .entries()
            .into_iter()
            .filter(|entry| entry.accelerator.is_available())
            .collect::<Vec<_>>();

        let preferred = available
            .iter()
            .position(|entry| entry.name != "cpu")
            .unwrap_or(0);

        match available.into_iter().nth(preferred) {
            Some(entry) => {
                log::debug!("Automatically selected accelerator `{}`", entry.name);
                Ok((entry.name, entry.accelerator))
            }
            None => Err(ConfigurationError::Unavailable {
                name: AcceleratorConfig::AUTO.to_string(),
            }),
        }
    }

    fn log_summary(&self, selection: &Selection) {
        for entry in self.registry.entries() {
            diagnostics::rank_zero_selection(format_args!(
                "{} available: {}, used: {}",
                entry.name.to_ascii_uppercase(),
                entry.accelerator.is_available(),
                entry.name == selection.name,
            ));
        }

        if let SelectionLogLevel::Full = GlobalConfig::get().accelerator.logger.level {
            let devices = selection
                .parallel_devices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            diagnostics::rank_zero_selection(format_args!(
                "Parallel devices ({}): [{}]",
                devices.len(),
                devices.join(", ")
            ));
        }
    }
}
