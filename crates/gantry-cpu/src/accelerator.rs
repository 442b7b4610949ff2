use gantry_runtime::{
    Accelerator, ConfigurationError, DeviceKind, DeviceRef, DeviceStats, Devices,
    diagnostics::rank_zero_warn, registry::AcceleratorRegistry, setup_environment_base,
};

/// Accelerator for CPU devices.
///
/// The CPU has no multi-device addressing: every device it hands out is the generic
/// [CPU device](DeviceRef::cpu), and `"auto"` always means a single device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuAccelerator;

impl CpuAccelerator {
    /// The registry name of the CPU accelerator.
    pub const NAME: &'static str = "cpu";

    /// Register the CPU accelerator in the given registry.
    pub fn register(registry: &AcceleratorRegistry) -> Result<(), ConfigurationError> {
        registry.register(Self::NAME, CpuAccelerator, "CpuAccelerator")
    }
}

impl Accelerator for CpuAccelerator {
    /// Fails if the root device isn't a CPU device.
    fn setup_environment(&self, root_device: &DeviceRef) -> Result<(), ConfigurationError> {
        setup_environment_base(self, root_device)?;

        if !root_device.is_kind(&DeviceKind::Cpu) {
            return Err(ConfigurationError::DeviceMismatch {
                expected: DeviceKind::Cpu,
                device: root_device.clone(),
            });
        }

        Ok(())
    }

    /// CPU device stats aren't supported yet.
    fn get_device_stats(&self, _device: &DeviceRef) -> DeviceStats {
        DeviceStats::new()
    }

    fn parse_devices(&self, devices: Devices) -> Devices {
        devices
    }

    /// Only integer counts are understood. Negative counts select no device.
    fn get_parallel_devices(&self, devices: &Devices) -> Vec<DeviceRef> {
        match devices {
            Devices::Count(requested) => {
                let count = usize::try_from((*requested).max(0)).unwrap_or(usize::MAX);
                let mut parallel_devices = Vec::new();

                if parallel_devices.try_reserve_exact(count).is_err() {
                    rank_zero_warn(format_args!(
                        "Can't allocate {requested} CPU devices for `devices={devices}`."
                    ));
                    return parallel_devices;
                }

                parallel_devices.resize(count, DeviceRef::cpu());
                parallel_devices
            }
            _ => {
                rank_zero_warn(format_args!(
                    "The flag `devices` must be an int with `accelerator='cpu'`, got `devices={devices}` instead."
                ));
                Vec::new()
            }
        }
    }

    fn auto_device_count(&self) -> usize {
        1
    }

    /// CPU is always available for execution.
    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_runtime::{diagnostics, rank};
    use rstest::rstest;
    use serial_test::serial;

    #[rstest]
    #[case::generic("cpu")]
    #[case::indexed("cpu:0")]
    #[case::upper("CPU")]
    fn accepts_cpu_root_devices(#[case] device: &str) {
        let device = device.parse::<DeviceRef>().unwrap();

        assert_eq!(CpuAccelerator.setup_environment(&device), Ok(()));
    }

    #[rstest]
    #[case::cuda("cuda:0")]
    #[case::mps("mps")]
    #[case::meta("meta")]
    #[case::other("xla:1")]
    fn rejects_other_root_devices(#[case] device: &str) {
        let device = device.parse::<DeviceRef>().unwrap();

        let err = CpuAccelerator.setup_environment(&device).unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::DeviceMismatch {
                expected: DeviceKind::Cpu,
                device: device.clone(),
            }
        );
        assert_eq!(
            err.to_string(),
            format!("Device should be CPU, got `{device}` instead.")
        );
    }

    #[rstest]
    #[case::count(Devices::Count(3))]
    #[case::negative(Devices::Count(-2))]
    #[case::token(Devices::from("4"))]
    #[case::auto(Devices::auto())]
    #[case::list(Devices::Indices(vec![0, 1, 2]))]
    fn parse_devices_is_identity(#[case] devices: Devices) {
        assert_eq!(CpuAccelerator.parse_devices(devices.clone()), devices);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(8)]
    #[serial]
    fn counts_expand_to_generic_cpu_devices(#[case] count: usize) {
        let (devices, warnings) =
            diagnostics::capture(|| CpuAccelerator.get_parallel_devices(&Devices::from(count)));

        assert_eq!(devices, vec![DeviceRef::cpu(); count]);
        assert!(warnings.is_empty());
    }

    #[test_log::test]
    #[serial]
    fn negative_counts_select_no_device_silently() {
        rank::set_rank(0);

        let (devices, warnings) =
            diagnostics::capture(|| CpuAccelerator.get_parallel_devices(&Devices::Count(-1)));

        assert!(devices.is_empty());
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case::max(i64::MAX)]
    #[case::beyond_address_space(1 << 62)]
    #[serial]
    fn oversized_counts_warn_and_select_nothing(#[case] count: i64) {
        rank::set_rank(0);

        let (devices, warnings) =
            diagnostics::capture(|| CpuAccelerator.get_parallel_devices(&Devices::Count(count)));

        assert!(devices.is_empty());
        assert_eq!(
            warnings,
            [format!("Can't allocate {count} CPU devices for `devices={count}`.")]
        );
    }

    #[test_log::test]
    #[serial]
    fn string_devices_warn_once_and_select_nothing() {
        rank::set_rank(0);

        let (devices, warnings) =
            diagnostics::capture(|| CpuAccelerator.get_parallel_devices(&Devices::from("4")));

        assert!(devices.is_empty());
        assert_eq!(
            warnings,
            ["The flag `devices` must be an int with `accelerator='cpu'`, got `devices='4'` instead."]
        );
    }

    #[test_log::test]
    #[serial]
    fn list_devices_warn_once_and_select_nothing() {
        rank::set_rank(0);

        let (devices, warnings) = diagnostics::capture(|| {
            CpuAccelerator.get_parallel_devices(&Devices::Indices(vec![0, 1, 2]))
        });

        assert!(devices.is_empty());
        assert_eq!(
            warnings,
            ["The flag `devices` must be an int with `accelerator='cpu'`, got `devices=[0, 1, 2]` instead."]
        );
    }

    #[test]
    fn stats_are_empty() {
        assert!(CpuAccelerator.get_device_stats(&DeviceRef::cpu()).is_empty());
        assert!(
            CpuAccelerator
                .get_device_stats(&DeviceRef::indexed(DeviceKind::Cuda, 0))
                .is_empty()
        );
    }

    #[test]
    fn constants_never_change() {
        for _ in 0..3 {
            assert_eq!(CpuAccelerator.auto_device_count(), 1);
            assert!(CpuAccelerator.is_available());
            assert_eq!(CpuAccelerator.name(), "cpu");
        }
    }

    #[test]
    fn registers_under_its_name() {
        let registry = AcceleratorRegistry::new();
        CpuAccelerator::register(&registry).unwrap();

        assert_eq!(registry.names(), ["cpu"]);
        assert_eq!(registry.description("cpu").as_deref(), Some("CpuAccelerator"));
        assert!(CpuAccelerator::register(&registry).is_err());
    }
}
