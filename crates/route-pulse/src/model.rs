//! pactl JSON records and pure classification helpers

use std::collections::BTreeMap;

use inputroute_core::DeviceType;
use serde::Deserialize;
use serde_json::Value;

/// Headset (HFP/HSP) card profiles, most preferred first.
pub const DEFAULT_HEADSET_PROFILES: &[&str] = &[
    "headset-head-unit-msbc",
    "headset-head-unit",
    "headset-head-unit-cvsd",
    "handsfree_head_unit",
    "headset_head_unit",
];

const A2DP_PROFILE_PREFIX: &str = "a2dp";
const BLUETOOTH_SOURCE_PREFIXES: &[&str] = &["bluez_input.", "bluez_source."];

pub type Properties = BTreeMap<String, Value>;

fn prop<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties.get(key).and_then(Value::as_str)
}

/// Bluetooth address shared by a card and the sources it exposes.
fn bluetooth_address(properties: &Properties) -> Option<&str> {
    prop(properties, "api.bluez5.address").or_else(|| prop(properties, "device.string"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub active_port: Option<String>,
}

impl Source {
    pub fn is_monitor(&self) -> bool {
        prop(&self.properties, "device.class") == Some("monitor") || self.name.ends_with(".monitor")
    }

    pub fn is_bluetooth(&self) -> bool {
        prop(&self.properties, "device.bus") == Some("bluetooth") || is_bluetooth_source_name(&self.name)
    }

    pub fn bluetooth_address(&self) -> Option<&str> {
        bluetooth_address(&self.properties)
    }

    pub fn product_name(&self) -> &str {
        prop(&self.properties, "device.product.name")
            .or_else(|| prop(&self.properties, "device.description"))
            .unwrap_or(self.description.as_str())
    }

    /// Map the source onto a platform device type.
    pub fn device_type(&self) -> DeviceType {
        let form_factor = prop(&self.properties, "device.form_factor").unwrap_or_default();
        let port = self.active_port.as_deref().unwrap_or_default().to_ascii_lowercase();

        let bus = prop(&self.properties, "device.bus");
        match bus {
            Some("bluetooth") => return DeviceType::BluetoothSco,
            Some("usb") => {
                return match form_factor {
                    "headset" | "headphone" | "hands-free" => DeviceType::UsbHeadset,
                    _ => DeviceType::UsbDevice,
                }
            }
            _ if self.is_bluetooth() => return DeviceType::BluetoothSco,
            _ => {}
        }

        if let Some(device_type) = classify_port(&port) {
            return device_type;
        }
        match form_factor {
            "internal" => DeviceType::BuiltinMic,
            "headset" | "headphone" | "microphone" => DeviceType::WiredHeadset,
            // Onboard codec without port metadata
            _ if bus == Some("pci") && !self.is_monitor() => DeviceType::BuiltinMic,
            _ => DeviceType::Unknown(-1),
        }
    }
}

/// Classify a lowercased ALSA or UCM port name.
///
/// ALSA ports look like `analog-input-rear-mic`; UCM ports like `[In] Mic1`.
fn classify_port(port: &str) -> Option<DeviceType> {
    if port.is_empty() {
        return None;
    }
    let device_type = if port.contains("headset") || port.contains("headphone-mic") {
        DeviceType::WiredHeadset
    } else if port.contains("internal-mic") || port.starts_with("[in] mic") {
        DeviceType::BuiltinMic
    } else if port.contains("linein") || port.contains("line-in") || port.starts_with("[in] line") {
        DeviceType::LineAnalog
    } else if port.contains("hdmi") {
        DeviceType::Hdmi
    } else if port.contains("mic") {
        // Front, rear, dock and plain mic jacks
        DeviceType::WiredHeadset
    } else {
        return None;
    };
    Some(device_type)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardProfile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub profiles: BTreeMap<String, CardProfile>,
    #[serde(default)]
    pub active_profile: Option<String>,
}

impl Card {
    pub fn is_bluetooth(&self) -> bool {
        prop(&self.properties, "device.bus") == Some("bluetooth") || self.name.starts_with("bluez_card.")
    }

    pub fn bluetooth_address(&self) -> Option<&str> {
        bluetooth_address(&self.properties)
    }

    pub fn product_name(&self) -> &str {
        prop(&self.properties, "device.description")
            .or_else(|| prop(&self.properties, "device.alias"))
            .unwrap_or(self.name.as_str())
    }

    fn has_available(&self, profile: &str) -> bool {
        self.profiles.get(profile).is_some_and(|p| p.available)
    }

    /// First available headset profile in `preference` order.
    pub fn headset_profile<'a, S: AsRef<str>>(&self, preference: &'a [S]) -> Option<&'a str> {
        preference
            .iter()
            .map(|profile| profile.as_ref())
            .find(|profile| self.has_available(profile))
    }

    pub fn is_in_headset_profile<S: AsRef<str>>(&self, preference: &[S]) -> bool {
        self.active_profile
            .as_deref()
            .is_some_and(|active| preference.iter().any(|p| p.as_ref() == active))
    }

    /// Available media (A2DP) profile to fall back to once the voice link stops.
    pub fn media_profile(&self) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(name, profile)| name.starts_with(A2DP_PROFILE_PREFIX) && profile.available)
            .map(|(name, _)| name.as_str())
    }
}

pub fn is_bluetooth_source_name(name: &str) -> bool {
    BLUETOOTH_SOURCE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

pub fn parse_sources(json: &str) -> Result<Vec<Source>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn parse_cards(json: &str) -> Result<Vec<Card>, serde_json::Error> {
    serde_json::from_str(json)
}
