//! Integration tests for the routing lifecycle.
//!
//! Everything runs against `MockPlatform`, so no sound server is needed.

use std::sync::Arc;
use std::thread;

use inputroute_core::mock::{MockPlatform, PlatformEvent, RouterCall};
use inputroute_core::{
    select_device, DeviceCatalog, DeviceCategory, DeviceType, PlatformDevice, RouteError,
    RoutingController, RoutingState,
};

const ALL_CATEGORIES: [DeviceCategory; 5] = [
    DeviceCategory::BuiltinMic,
    DeviceCategory::WiredHeadset,
    DeviceCategory::UsbAudio,
    DeviceCategory::Bluetooth,
    DeviceCategory::Other,
];

/// Asserts every on→off transition clears routing before stopping the link.
fn assert_disable_order(calls: &[RouterCall]) {
    for (i, call) in calls.iter().enumerate() {
        if *call == RouterCall::StopBluetoothLink {
            assert!(i > 0, "link stopped with no preceding call: {calls:?}");
            assert_eq!(
                calls[i - 1],
                RouterCall::SetBluetoothRoutingOn(false),
                "link stopped before routing was cleared: {calls:?}"
            );
        }
    }
}

#[test]
fn test_revert_twice_is_same_as_once() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());
    controller.start(DeviceCategory::Bluetooth).unwrap();

    controller.revert();
    let after_first = platform.events();
    controller.revert();

    assert_eq!(platform.events(), after_first);
    assert_eq!(controller.state(), RoutingState::Inactive);
}

#[test]
fn test_start_then_revert_leaves_bluetooth_off_for_every_category() {
    for initially_on in [false, true] {
        for category in ALL_CATEGORIES {
            let platform = MockPlatform::new();
            platform.set_bluetooth_routing_on(initially_on);
            let controller = RoutingController::new(platform.clone());

            controller.start(category).unwrap();
            controller.revert();

            assert!(
                !platform.is_bluetooth_routing_on(),
                "{category:?} with routing initially {initially_on}"
            );
            assert_disable_order(&platform.routing_calls());
        }
    }
}

#[test]
fn test_start_bluetooth_from_inactive_starts_link_first() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());

    assert_eq!(
        controller.start(DeviceCategory::Bluetooth).unwrap(),
        RoutingState::ActiveBluetooth
    );

    assert_eq!(
        platform.routing_calls(),
        vec![RouterCall::StartBluetoothLink, RouterCall::SetBluetoothRoutingOn(true)]
    );
}

#[test]
fn test_bluetooth_then_wired_headset_call_sequence() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());

    controller.start(DeviceCategory::Bluetooth).unwrap();
    let state = controller.start(DeviceCategory::WiredHeadset).unwrap();

    assert_eq!(state, RoutingState::ActiveNonBluetooth);
    assert!(!platform.is_bluetooth_routing_on());
    assert_eq!(
        platform.routing_calls(),
        vec![
            RouterCall::StartBluetoothLink,
            RouterCall::SetBluetoothRoutingOn(true),
            RouterCall::SetBluetoothRoutingOn(false),
            RouterCall::StopBluetoothLink,
        ]
    );
}

#[test]
fn test_start_builtin_mic_from_inactive_is_pure_bookkeeping() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());

    controller.start(DeviceCategory::BuiltinMic).unwrap();

    assert!(platform.routing_calls().is_empty());
    assert_eq!(controller.state(), RoutingState::ActiveNonBluetooth);
}

#[test]
fn test_state_machine_transitions() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());
    assert_eq!(controller.state(), RoutingState::Inactive);

    let steps = [
        (DeviceCategory::UsbAudio, RoutingState::ActiveNonBluetooth, false),
        (DeviceCategory::Bluetooth, RoutingState::ActiveBluetooth, true),
        (DeviceCategory::Bluetooth, RoutingState::ActiveBluetooth, true),
        (DeviceCategory::Other, RoutingState::ActiveNonBluetooth, false),
        (DeviceCategory::Bluetooth, RoutingState::ActiveBluetooth, true),
    ];
    for (category, expected, routing_on) in steps {
        assert_eq!(controller.start(category).unwrap(), expected);
        assert_eq!(controller.state(), expected);
        assert_eq!(platform.is_bluetooth_routing_on(), routing_on);
    }

    controller.revert();
    assert_eq!(controller.state(), RoutingState::Inactive);
    assert!(!platform.is_bluetooth_routing_on());
    assert_disable_order(&platform.routing_calls());
}

#[test]
fn test_elevation_precedes_every_routing_call() {
    let platform = MockPlatform::new();
    let controller = RoutingController::new(platform.clone());

    controller.start(DeviceCategory::Bluetooth).unwrap();
    controller.start(DeviceCategory::BuiltinMic).unwrap();
    controller.revert();

    let events = platform.events();
    let first_routing = events
        .iter()
        .position(|e| matches!(e, PlatformEvent::Routing(_)))
        .unwrap();
    let first_elevation = events
        .iter()
        .position(|e| matches!(e, PlatformEvent::Elevated(_)))
        .unwrap();
    assert!(first_elevation < first_routing);
    assert_eq!(events.last(), Some(&PlatformEvent::Released));
}

#[test]
fn test_unavailable_subsystem_takes_no_routing_action() {
    let platform = MockPlatform::unavailable();
    platform.set_bluetooth_routing_on(true);
    let controller = RoutingController::new(platform.clone());

    let err = controller.start(DeviceCategory::BuiltinMic).unwrap_err();

    assert!(matches!(err, RouteError::AudioSubsystemUnavailable(_)));
    assert!(platform.routing_calls().is_empty());
    assert!(platform.is_bluetooth_routing_on());
    assert!(!controller.is_running());
}

#[test]
fn test_concurrent_starts_keep_disable_order() {
    let platform = MockPlatform::new();
    let controller = Arc::new(RoutingController::new(platform.clone()));

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let controller = Arc::clone(&controller);
            thread::spawn(move || {
                for round in 0..25 {
                    let category = if (worker + round) % 2 == 0 {
                        DeviceCategory::Bluetooth
                    } else {
                        DeviceCategory::WiredHeadset
                    };
                    controller.start(category).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    controller.revert();
    assert!(!platform.is_bluetooth_routing_on());
    assert_disable_order(&platform.routing_calls());
}

#[test]
fn test_catalog_to_controller_flow() {
    let platform = MockPlatform::with_devices(vec![
        PlatformDevice::new(1u32, "Pixel Mic", DeviceType::BuiltinMic),
        PlatformDevice::new(3u32, "HDMI capture", DeviceType::Hdmi),
        PlatformDevice::new(2u32, "AirPods", DeviceType::BluetoothSco),
    ]);
    let catalog = DeviceCatalog::new(platform.clone());
    let controller = RoutingController::new(platform.clone());

    let devices = catalog.enumerate().unwrap();
    let picked = select_device(&devices, Some(1)).unwrap();
    assert_eq!(picked.display_name, "AirPods (Bluetooth)");

    controller.start_device(picked).unwrap();
    assert!(platform.is_bluetooth_routing_on());

    controller.revert();
    assert!(!platform.is_bluetooth_routing_on());
}

#[test]
fn test_input_device_serializes_for_callers() {
    let platform = MockPlatform::with_devices(vec![PlatformDevice::new(
        "bluez_input.AA_BB",
        "AirPods",
        DeviceType::BluetoothSco,
    )]);
    let devices = DeviceCatalog::new(platform).enumerate().unwrap();

    let json = serde_json::to_value(&devices).unwrap();

    assert_eq!(
        json,
        serde_json::json!([{
            "id": "bluez_input.AA_BB",
            "display_name": "AirPods (Bluetooth)",
            "category": "bluetooth",
        }])
    );
}
