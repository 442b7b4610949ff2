use gantry_runtime::{
    Accelerator, ConfigurationError, DeviceKind, DeviceRef, DeviceStats, Devices,
    diagnostics::rank_zero_warn, setup_environment_base,
};

/// Host accelerator with a single logical device.
#[derive(Debug, Default)]
pub struct DummyHostAccelerator;

impl Accelerator for DummyHostAccelerator {
    fn get_device_stats(&self, _device: &DeviceRef) -> DeviceStats {
        DeviceStats::new()
    }

    fn parse_devices(&self, devices: Devices) -> Devices {
        devices
    }

    fn get_parallel_devices(&self, devices: &Devices) -> Vec<DeviceRef> {
        match devices {
            Devices::Count(count) => vec![DeviceRef::cpu(); (*count).max(0) as usize],
            _ => Vec::new(),
        }
    }

    fn auto_device_count(&self) -> usize {
        1
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

/// GPU-like accelerator addressing `count` devices individually.
#[derive(new, Debug)]
pub struct DummyGpuAccelerator {
    pub count: u32,
    pub available: bool,
}

impl Accelerator for DummyGpuAccelerator {
    fn setup_environment(&self, root_device: &DeviceRef) -> Result<(), ConfigurationError> {
        setup_environment_base(self, root_device)?;

        if !root_device.is_kind(&DeviceKind::Cuda) {
            return Err(ConfigurationError::DeviceMismatch {
                expected: DeviceKind::Cuda,
                device: root_device.clone(),
            });
        }

        Ok(())
    }

    fn get_device_stats(&self, device: &DeviceRef) -> DeviceStats {
        let mut stats = DeviceStats::new();
        stats.insert("index".into(), device.index.unwrap_or_default().into());
        stats.insert("memory.used".into(), 1024.into());
        stats
    }

    fn parse_devices(&self, devices: Devices) -> Devices {
        match devices {
            Devices::Token(token) => match Devices::parse(&token) {
                Devices::Token(_) => Devices::Token(token),
                parsed => self.parse_devices(parsed),
            },
            Devices::Count(-1) => Devices::Count(self.count as i64),
            devices => devices,
        }
    }

    fn get_parallel_devices(&self, devices: &Devices) -> Vec<DeviceRef> {
        let indices: Vec<u32> = match devices {
            Devices::Count(count) => (0..(*count).max(0) as u32).collect(),
            Devices::Indices(indices) => indices.clone(),
            Devices::Token(_) => {
                rank_zero_warn(format_args!("Unsupported `devices={devices}`"));
                return Vec::new();
            }
        };

        indices
            .into_iter()
            .filter(|index| *index < self.count)
            .map(|index| DeviceRef::indexed(DeviceKind::Cuda, index))
            .collect()
    }

    fn auto_device_count(&self) -> usize {
        self.count as usize
    }

    fn is_available(&self) -> bool {
        self.available && self.count > 0
    }

    fn name(&self) -> &'static str {
        "cuda"
    }
}

/// Accelerator producing devices it then refuses to run on.
#[derive(Debug, Default)]
pub struct DummyMisconfiguredAccelerator;

impl Accelerator for DummyMisconfiguredAccelerator {
    fn setup_environment(&self, root_device: &DeviceRef) -> Result<(), ConfigurationError> {
        setup_environment_base(self, root_device)?;

        Err(ConfigurationError::DeviceMismatch {
            expected: DeviceKind::Xpu,
            device: root_device.clone(),
        })
    }

    fn get_device_stats(&self, _device: &DeviceRef) -> DeviceStats {
        DeviceStats::new()
    }

    fn parse_devices(&self, devices: Devices) -> Devices {
        devices
    }

    fn get_parallel_devices(&self, _devices: &Devices) -> Vec<DeviceRef> {
        vec![DeviceRef::cpu()]
    }

    fn auto_device_count(&self) -> usize {
        1
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "xpu"
    }
}
