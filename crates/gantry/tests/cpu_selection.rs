use gantry::{
    AcceleratorConnector, ConfigurationError, DeviceKind, DeviceRef, Devices, diagnostics, rank,
};
use serial_test::serial;

#[test_log::test]
fn builtin_registry_contains_cpu() {
    let registry = gantry::registry();

    assert!(registry.contains("cpu"));
    assert!(registry.available().contains(&"cpu".to_string()));
    assert_eq!(gantry::registry().names(), registry.names());
}

#[test_log::test]
fn auto_selects_a_single_cpu_device() {
    let selection = AcceleratorConnector::new(gantry::registry())
        .connect("auto", Devices::auto())
        .unwrap();

    assert_eq!(selection.name, "cpu");
    assert_eq!(selection.devices, Devices::Count(1));
    assert_eq!(selection.root_device(), &DeviceRef::cpu());
    assert!(selection.root_device_stats().is_empty());
}

#[test_log::test]
fn count_selects_that_many_cpu_devices() {
    let selection = AcceleratorConnector::new(gantry::registry())
        .connect("CPU", Devices::parse("3"))
        .unwrap();

    assert_eq!(selection.parallel_devices(), vec![DeviceRef::cpu(); 3]);
    assert!(
        selection
            .parallel_devices()
            .iter()
            .all(|device| device.kind == DeviceKind::Cpu && device.index.is_none())
    );
}

#[test_log::test]
#[serial]
fn list_on_cpu_warns_then_fails_setup() {
    rank::set_rank(0);

    let (result, warnings) = diagnostics::capture(|| {
        AcceleratorConnector::new(gantry::registry()).connect("cpu", Devices::parse("0,1"))
    });

    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::NoDevices {
            accelerator: "cpu".into(),
            devices: Devices::Indices(vec![0, 1]),
        }
    );
    assert_eq!(warnings.len(), 1);
}

#[test_log::test]
#[serial]
fn zero_devices_fail_setup_without_warning() {
    rank::set_rank(0);

    let (result, warnings) = diagnostics::capture(|| {
        AcceleratorConnector::new(gantry::registry()).connect("cpu", 0)
    });

    assert!(matches!(
        result,
        Err(ConfigurationError::NoDevices { .. })
    ));
    assert!(warnings.is_empty());
}

#[test_log::test]
#[serial]
fn oversized_count_fails_setup_instead_of_aborting() {
    rank::set_rank(0);

    let (result, warnings) = diagnostics::capture(|| {
        AcceleratorConnector::new(gantry::registry()).connect("cpu", i64::MAX)
    });

    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::NoDevices {
            accelerator: "cpu".into(),
            devices: Devices::Count(i64::MAX),
        }
    );
    assert_eq!(warnings.len(), 1);
}

#[test_log::test]
#[serial]
fn connects_from_global_config() {
    let selection = gantry::connect_from_config().unwrap();

    assert!(selection.num_devices() >= 1);
    assert!(gantry::registry().contains(&selection.name));
}
