use std::collections::HashSet;

use inputroute_core::{DeviceRegistry, DeviceType, PlatformDevice, RouteError};

use crate::model::{Card, Source};
use crate::pactl::Pactl;

/// Build the registry view from pactl records.
///
/// Sources come first in server order, monitors excluded. Bluetooth cards
/// that offer a headset profile but expose no input yet follow, so a
/// headset still in media mode can be picked.
pub fn input_devices<S: AsRef<str>>(
    sources: &[Source],
    cards: &[Card],
    headset_profiles: &[S],
) -> Vec<PlatformDevice> {
    let mut devices: Vec<PlatformDevice> = sources
        .iter()
        .filter(|source| !source.is_monitor())
        .map(|source| {
            PlatformDevice::new(
                source.name.as_str(),
                source.product_name(),
                source.device_type(),
            )
        })
        .collect();

    let exposed: HashSet<&str> = sources
        .iter()
        .filter(|source| source.is_bluetooth())
        .filter_map(Source::bluetooth_address)
        .collect();

    for card in cards.iter().filter(|card| card.is_bluetooth()) {
        if card.bluetooth_address().is_some_and(|address| exposed.contains(address)) {
            continue;
        }
        if card.headset_profile(headset_profiles).is_none() {
            tracing::trace!(card = %card.name, "Bluetooth card has no headset profile");
            continue;
        }
        devices.push(PlatformDevice::new(
            card.name.as_str(),
            card.product_name(),
            DeviceType::BluetoothSco,
        ));
    }

    devices
}

/// [`DeviceRegistry`] backed by `pactl`.
#[derive(Debug, Clone)]
pub struct PulseRegistry {
    pactl: Pactl,
    headset_profiles: Vec<String>,
}

impl PulseRegistry {
    pub fn new(pactl: Pactl, headset_profiles: Vec<String>) -> Self {
        Self {
            pactl,
            headset_profiles,
        }
    }
}

impl DeviceRegistry for PulseRegistry {
    fn list_input_devices(&self) -> Result<Vec<PlatformDevice>, RouteError> {
        let sources = self.pactl.list_sources()?;
        let cards = self.pactl.list_cards()?;
        Ok(input_devices(&sources, &cards, &self.headset_profiles))
    }
}
