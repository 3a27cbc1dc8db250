//! In-memory platform for tests and hosts without an audio subsystem.
//!
//! Every capability handed out by a [`MockPlatform`] shares one recorder,
//! so the order of elevation and routing calls can be asserted after the
//! router has moved into the routing service thread.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::PlatformDevice;
use crate::error::RouteError;
use crate::traits::{AudioPlatform, AudioRouter, DeviceRegistry, ForegroundElevation, StatusText};

/// A routing call issued to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterCall {
    StartBluetoothLink,
    StopBluetoothLink,
    SetBluetoothRoutingOn(bool),
}

/// Anything observable on the mock platform, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Routing(RouterCall),
    Elevated(StatusText),
    Released,
}

#[derive(Debug)]
struct Recorder {
    available: bool,
    registry_fails: bool,
    devices: Vec<PlatformDevice>,
    link_up: bool,
    routing_on: bool,
    events: Vec<PlatformEvent>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            available: true,
            registry_fails: false,
            devices: Vec::new(),
            link_up: false,
            routing_on: false,
            events: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<Recorder>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Recorder> {
    // A panicking test thread must not hide the recorded calls.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn routing_calls(shared: &Shared) -> Vec<RouterCall> {
    lock(shared)
        .events
        .iter()
        .filter_map(|event| match event {
            PlatformEvent::Routing(call) => Some(call.clone()),
            _ => None,
        })
        .collect()
}

/// Recording [`AudioRouter`].
#[derive(Debug, Clone, Default)]
pub struct MockRouter {
    shared: Shared,
}

impl MockRouter {
    /// A router whose Bluetooth routing was switched on by someone else.
    pub fn with_bluetooth_routing_on() -> Self {
        let router = Self::default();
        {
            let mut recorder = lock(&router.shared);
            recorder.link_up = true;
            recorder.routing_on = true;
        }
        router
    }

    pub fn calls(&self) -> Vec<RouterCall> {
        routing_calls(&self.shared)
    }

    pub fn clear_calls(&self) {
        lock(&self.shared).events.clear();
    }

    fn record(&self, call: RouterCall) {
        let mut recorder = lock(&self.shared);
        match call {
            RouterCall::StartBluetoothLink => recorder.link_up = true,
            RouterCall::StopBluetoothLink => recorder.link_up = false,
            RouterCall::SetBluetoothRoutingOn(on) => recorder.routing_on = on,
        }
        recorder.events.push(PlatformEvent::Routing(call));
    }
}

impl AudioRouter for MockRouter {
    fn start_bluetooth_link(&mut self) {
        self.record(RouterCall::StartBluetoothLink);
    }

    fn stop_bluetooth_link(&mut self) {
        self.record(RouterCall::StopBluetoothLink);
    }

    fn set_bluetooth_routing_on(&mut self, on: bool) {
        self.record(RouterCall::SetBluetoothRoutingOn(on));
    }

    fn is_bluetooth_routing_on(&self) -> bool {
        lock(&self.shared).routing_on
    }
}

/// Recording [`ForegroundElevation`].
#[derive(Debug, Clone)]
pub struct MockElevation {
    shared: Shared,
}

impl ForegroundElevation for MockElevation {
    fn elevate(&mut self, status: &StatusText) {
        lock(&self.shared)
            .events
            .push(PlatformEvent::Elevated(status.clone()));
    }

    fn release(&mut self) {
        lock(&self.shared).events.push(PlatformEvent::Released);
    }
}

/// Scriptable platform implementing every capability.
///
/// # Example
///
/// ```
/// use inputroute_core::mock::MockPlatform;
/// use inputroute_core::{DeviceCategory, RoutingController};
///
/// let platform = MockPlatform::new();
/// let controller = RoutingController::new(platform.clone());
///
/// controller.start(DeviceCategory::Bluetooth).unwrap();
/// assert!(platform.is_bluetooth_routing_on());
///
/// controller.revert();
/// assert!(!platform.is_bluetooth_routing_on());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    shared: Shared,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform whose audio manager cannot be obtained.
    pub fn unavailable() -> Self {
        let platform = Self::default();
        platform.set_available(false);
        platform
    }

    pub fn with_devices(devices: Vec<PlatformDevice>) -> Self {
        let platform = Self::default();
        platform.set_devices(devices);
        platform
    }

    pub fn set_available(&self, available: bool) {
        lock(&self.shared).available = available;
    }

    pub fn set_registry_fails(&self, fails: bool) {
        lock(&self.shared).registry_fails = fails;
    }

    /// Replace the attached devices, as if hardware was plugged or unplugged.
    pub fn set_devices(&self, devices: Vec<PlatformDevice>) {
        lock(&self.shared).devices = devices;
    }

    /// Flip Bluetooth routing outside the controller's knowledge.
    pub fn set_bluetooth_routing_on(&self, on: bool) {
        let mut recorder = lock(&self.shared);
        recorder.routing_on = on;
        recorder.link_up = on;
    }

    pub fn is_bluetooth_routing_on(&self) -> bool {
        lock(&self.shared).routing_on
    }

    pub fn is_bluetooth_link_up(&self) -> bool {
        lock(&self.shared).link_up
    }

    pub fn routing_calls(&self) -> Vec<RouterCall> {
        routing_calls(&self.shared)
    }

    pub fn events(&self) -> Vec<PlatformEvent> {
        lock(&self.shared).events.clone()
    }
}

impl DeviceRegistry for MockPlatform {
    fn list_input_devices(&self) -> Result<Vec<PlatformDevice>, RouteError> {
        let recorder = lock(&self.shared);
        if recorder.registry_fails {
            return Err(RouteError::AudioSubsystemUnavailable(
                "mock registry failure".to_string(),
            ));
        }
        Ok(recorder.devices.clone())
    }
}

impl AudioPlatform for MockPlatform {
    type Router = MockRouter;
    type Elevation = MockElevation;

    fn audio_router(&self) -> Result<MockRouter, RouteError> {
        if !lock(&self.shared).available {
            return Err(RouteError::AudioSubsystemUnavailable(
                "mock audio manager not available".to_string(),
            ));
        }
        Ok(MockRouter {
            shared: self.shared.clone(),
        })
    }

    fn elevation(&self) -> MockElevation {
        MockElevation {
            shared: self.shared.clone(),
        }
    }
}
