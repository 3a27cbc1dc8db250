//! Routing preference state and the platform call sequences behind it
//!
//! [`RoutingPreference`] is the only mutable state of the routing service.
//! Every transition goes through [`RoutingPreference::apply`] or
//! [`RoutingPreference::revert`], which issue the Bluetooth link and routing
//! calls in a fixed order:
//!
//! - enabling: start link, then routing on
//! - disabling: routing off, then stop link
//!
//! Disabling is keyed on the live platform state
//! ([`AudioRouter::is_bluetooth_routing_on`]), so reverting when Bluetooth
//! was never enabled issues no platform calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::DeviceCategory;
use crate::traits::AudioRouter;

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingState {
    Inactive,
    ActiveNonBluetooth,
    ActiveBluetooth,
}

impl RoutingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::ActiveNonBluetooth => "active (default routing)",
            Self::ActiveBluetooth => "active (bluetooth)",
        }
    }
}

impl std::fmt::Display for RoutingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currently applied preference.
///
/// `is_active` implies `active_category` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPreference {
    is_active: bool,
    active_category: Option<DeviceCategory>,
    applied_at: Option<DateTime<Utc>>,
}

impl RoutingPreference {
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn active_category(&self) -> Option<DeviceCategory> {
        self.active_category
    }

    /// When the last preference was applied.
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        self.applied_at
    }

    pub fn state(&self) -> RoutingState {
        match (self.is_active, self.active_category) {
            (true, Some(DeviceCategory::Bluetooth)) => RoutingState::ActiveBluetooth,
            (true, Some(_)) => RoutingState::ActiveNonBluetooth,
            _ => RoutingState::Inactive,
        }
    }

    /// Dispatch on `category` and record it as the active preference.
    ///
    /// Re-applying the active category re-issues the platform calls.
    pub fn apply<R: AudioRouter + ?Sized>(&mut self, router: &mut R, category: DeviceCategory) {
        match category {
            DeviceCategory::Bluetooth => {
                tracing::debug!("Preference set to Bluetooth, activating SCO link");
                enable_bluetooth(router);
            }
            DeviceCategory::BuiltinMic
            | DeviceCategory::WiredHeadset
            | DeviceCategory::UsbAudio
            | DeviceCategory::Other => {
                tracing::debug!(%category, "Preference set to non-Bluetooth, deactivating SCO link");
                disable_bluetooth(router);
            }
        }

        self.is_active = true;
        self.active_category = Some(category);
        self.applied_at = Some(Utc::now());
    }

    /// Undo any non-default routing and return to inactive.
    ///
    /// Safe to call any number of times; returns whether Bluetooth routing
    /// had to be switched off.
    pub fn revert<R: AudioRouter + ?Sized>(&mut self, router: &mut R) -> bool {
        let disabled = disable_bluetooth(router);
        *self = Self::default();
        disabled
    }
}

fn enable_bluetooth<R: AudioRouter + ?Sized>(router: &mut R) {
    router.start_bluetooth_link();
    router.set_bluetooth_routing_on(true);
}

/// Routing flag is cleared before the link is torn down.
fn disable_bluetooth<R: AudioRouter + ?Sized>(router: &mut R) -> bool {
    if !router.is_bluetooth_routing_on() {
        return false;
    }
    router.set_bluetooth_routing_on(false);
    router.stop_bluetooth_link();
    true
}
