use super::*;
use crate::device::mock_graphics_device::{MockDeviceFactory, MockGraphicsDevice};

fn mock_device(backend: &'static str) -> Arc<Mutex<dyn GraphicsDevice>> {
    Arc::new(Mutex::new(MockGraphicsDevice::new().with_backend(backend)))
}

#[test]
fn test_matching_driver_is_borrowed() {
    let factory = MockDeviceFactory::new();
    let host = mock_device("mock");
    let drivers = vec![Driver::device(DEVICE_BINDING_TOKEN, host.clone())];

    let handle = resolve_device(&drivers, DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(!handle.is_owned());
    assert_eq!(handle.presentation_mode(), PresentationMode::Direct);
    assert!(Arc::ptr_eq(handle.device(), &host));
    assert_eq!(factory.created_count(), 0);
}

#[test]
fn test_no_drivers_creates_owned_device() {
    let factory = MockDeviceFactory::new();

    let handle = resolve_device(&[], DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(handle.is_owned());
    assert_eq!(handle.presentation_mode(), PresentationMode::Manual);
    assert_eq!(factory.created_count(), 1);
    assert!(handle.device().lock().unwrap().surface().is_none());
}

#[test]
fn test_opaque_payload_falls_back() {
    let factory = MockDeviceFactory::new();
    let drivers = vec![Driver::opaque(DEVICE_BINDING_TOKEN, Arc::new(42u32))];

    let handle = resolve_device(&drivers, DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(handle.is_owned());
}

#[test]
fn test_foreign_backend_falls_back() {
    let factory = MockDeviceFactory::new();
    let drivers = vec![Driver::device(DEVICE_BINDING_TOKEN, mock_device("metal"))];

    let handle = resolve_device(&drivers, DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(handle.is_owned());
    assert_eq!(factory.created_count(), 1);
}

#[test]
fn test_wrong_name_is_ignored() {
    let factory = MockDeviceFactory::new();
    let drivers = vec![Driver::device("SomeOtherDevice", mock_device("mock"))];

    let handle = resolve_device(&drivers, DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(handle.is_owned());
}

#[test]
fn test_first_valid_match_wins_after_mismatch() {
    let factory = MockDeviceFactory::new();
    let good = mock_device("mock");
    let drivers = vec![
        Driver::opaque(DEVICE_BINDING_TOKEN, Arc::new("not a device")),
        Driver::device(DEVICE_BINDING_TOKEN, good.clone()),
    ];

    let handle = resolve_device(&drivers, DEVICE_BINDING_TOKEN, &factory).unwrap();

    assert!(Arc::ptr_eq(handle.device(), &good));
}

#[test]
fn test_driver_debug_hides_payload() {
    let driver = Driver::opaque("x", Arc::new(1u8));
    assert_eq!(format!("{:?}", driver), "Driver { name: \"x\", payload: \"Opaque\" }");
}
