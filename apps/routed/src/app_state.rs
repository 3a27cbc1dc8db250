//! Shared daemon state
//!
//! [`AppState`] pairs the device catalog with the routing controller and
//! keeps the last enumeration snapshot, so a user can pick "device 2" from
//! the list they were shown.
//!
//! # Thread Safety
//!
//! The controller serializes its own commands. The snapshot sits behind a
//! `Mutex` because console commands run on blocking worker threads.

use std::sync::{Mutex, MutexGuard, PoisonError};

use inputroute_core::{
    select_device, AudioPlatform, DeviceCatalog, DeviceRegistry, InputDevice, RouteError,
    RoutingController, RoutingPreference,
};

/// Platforms the daemon can drive: a registry and a routing backend.
pub trait DaemonPlatform: AudioPlatform + DeviceRegistry + Clone {}

impl<P: AudioPlatform + DeviceRegistry + Clone> DaemonPlatform for P {}

pub struct AppState<P: DaemonPlatform> {
    catalog: DeviceCatalog<P>,
    controller: RoutingController<P>,
    /// Devices from the last refresh, in display order
    devices: Mutex<Vec<InputDevice>>,
}

impl<P: DaemonPlatform> AppState<P> {
    pub fn new(platform: P, status_title: &str) -> Self {
        Self {
            catalog: DeviceCatalog::new(platform.clone()),
            controller: RoutingController::new(platform).with_status_title(status_title),
            devices: Mutex::new(Vec::new()),
        }
    }

    fn lock_devices(&self) -> MutexGuard<'_, Vec<InputDevice>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-enumerate and replace the snapshot.
    pub fn refresh(&self) -> Result<Vec<InputDevice>, RouteError> {
        let devices = self.catalog.enumerate()?;
        *self.lock_devices() = devices.clone();
        Ok(devices)
    }

    /// Apply the device at 1-based `position` in the last snapshot.
    pub fn apply_position(&self, position: Option<usize>) -> Result<InputDevice, RouteError> {
        let device = {
            let devices = self.lock_devices();
            let index = position.and_then(|p| p.checked_sub(1));
            select_device(&devices, index)?.clone()
        };
        self.controller.start_device(&device)?;
        Ok(device)
    }

    pub fn controller(&self) -> &RoutingController<P> {
        &self.controller
    }

    pub fn revert(&self) {
        self.controller.revert();
    }

    pub fn preference(&self) -> RoutingPreference {
        self.controller.preference()
    }
}
