use crate::device::InputDevice;
use crate::error::RouteError;
use crate::traits::DeviceRegistry;

/// Enumerates selectable input devices from a platform registry.
///
/// Holds no state between calls: every [`enumerate`](Self::enumerate)
/// re-queries the registry, since devices come and go.
pub struct DeviceCatalog<R> {
    registry: R,
}

impl<R: DeviceRegistry> DeviceCatalog<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// List the attached built-in, wired, USB and Bluetooth input devices.
    ///
    /// Platform order is preserved. Devices of any other type are skipped.
    /// An empty list is not an error.
    pub fn enumerate(&self) -> Result<Vec<InputDevice>, RouteError> {
        let reported = self.registry.list_input_devices()?;
        let total = reported.len();

        let devices: Vec<InputDevice> = reported
            .into_iter()
            .filter_map(|device| {
                let id = device.id.clone();
                let device_type = device.device_type;
                let input = InputDevice::from_platform(device);
                if input.is_none() {
                    tracing::trace!(%id, ?device_type, "Skipping unsupported input device");
                }
                input
            })
            .collect();

        tracing::debug!(total, selectable = devices.len(), "Enumerated input devices");
        Ok(devices)
    }
}

/// Resolve a user's pick against an enumeration snapshot.
///
/// This is caller-side validation; the routing controller itself never sees
/// an invalid pick.
pub fn select_device(devices: &[InputDevice], index: Option<usize>) -> Result<&InputDevice, RouteError> {
    if devices.is_empty() {
        return Err(RouteError::NoDevicesFound);
    }
    index
        .and_then(|index| devices.get(index))
        .ok_or(RouteError::NoSelectionMade)
}
