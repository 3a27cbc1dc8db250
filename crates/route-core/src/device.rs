use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform device type code, as reported by the device registry.
///
/// The numeric values follow the mobile audio platform's device type
/// constants so hosts that report raw integers can convert with
/// [`DeviceType::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    WiredHeadset,
    LineAnalog,
    LineDigital,
    BluetoothSco,
    Hdmi,
    UsbDevice,
    BuiltinMic,
    FmTuner,
    TvTuner,
    Telephony,
    UsbHeadset,
    RemoteSubmix,
    BleHeadset,
    Unknown(i32),
}

impl DeviceType {
    pub fn from_code(code: i32) -> Self {
        match code {
            3 => Self::WiredHeadset,
            5 => Self::LineAnalog,
            6 => Self::LineDigital,
            7 => Self::BluetoothSco,
            9 => Self::Hdmi,
            11 => Self::UsbDevice,
            15 => Self::BuiltinMic,
            16 => Self::FmTuner,
            17 => Self::TvTuner,
            18 => Self::Telephony,
            22 => Self::UsbHeadset,
            25 => Self::RemoteSubmix,
            26 => Self::BleHeadset,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::WiredHeadset => 3,
            Self::LineAnalog => 5,
            Self::LineDigital => 6,
            Self::BluetoothSco => 7,
            Self::Hdmi => 9,
            Self::UsbDevice => 11,
            Self::BuiltinMic => 15,
            Self::FmTuner => 16,
            Self::TvTuner => 17,
            Self::Telephony => 18,
            Self::UsbHeadset => 22,
            Self::RemoteSubmix => 25,
            Self::BleHeadset => 26,
            Self::Unknown(code) => *code,
        }
    }
}

/// Routing category of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    BuiltinMic,
    WiredHeadset,
    UsbAudio,
    Bluetooth,
    /// Never produced by enumeration; routing treats it like any
    /// non-Bluetooth category.
    Other,
}

impl DeviceCategory {
    /// Map a platform type code to a selectable category.
    ///
    /// Returns `None` for every type outside the four recognized categories.
    pub fn classify(device_type: DeviceType) -> Option<Self> {
        match device_type {
            DeviceType::BuiltinMic => Some(Self::BuiltinMic),
            DeviceType::WiredHeadset => Some(Self::WiredHeadset),
            DeviceType::UsbDevice | DeviceType::UsbHeadset => Some(Self::UsbAudio),
            DeviceType::BluetoothSco => Some(Self::Bluetooth),
            DeviceType::LineAnalog
            | DeviceType::LineDigital
            | DeviceType::Hdmi
            | DeviceType::FmTuner
            | DeviceType::TvTuner
            | DeviceType::Telephony
            | DeviceType::RemoteSubmix
            | DeviceType::BleHeadset
            | DeviceType::Unknown(_) => None,
        }
    }

    pub fn for_routing(device_type: DeviceType) -> Self {
        Self::classify(device_type).unwrap_or(Self::Other)
    }

    /// Human label used in display names. Presentation only.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BuiltinMic => "Internal Mic",
            Self::WiredHeadset => "Wired Headset",
            Self::UsbAudio => "USB Audio",
            Self::Bluetooth => "Bluetooth",
            Self::Other => "Other",
        }
    }

    pub fn is_bluetooth(&self) -> bool {
        matches!(self, Self::Bluetooth)
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Platform-assigned device identifier.
///
/// Only meaningful within a single enumeration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw device record as reported by the platform registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDevice {
    pub id: DeviceId,
    pub product_name: String,
    pub device_type: DeviceType,
}

impl PlatformDevice {
    pub fn new(id: impl Into<DeviceId>, product_name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            id: id.into(),
            product_name: product_name.into(),
            device_type,
        }
    }
}

/// A selectable input device from one enumeration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDevice {
    pub id: DeviceId,
    pub display_name: String,
    pub category: DeviceCategory,
}

impl InputDevice {
    pub fn new(id: DeviceId, display_name: String, category: DeviceCategory) -> Self {
        Self {
            id,
            display_name,
            category,
        }
    }

    /// Build the caller-facing record, or `None` if the type is not selectable.
    pub fn from_platform(device: PlatformDevice) -> Option<Self> {
        let category = DeviceCategory::classify(device.device_type)?;
        let display_name = format!("{} ({})", device.product_name, category.label());
        Some(Self::new(device.id, display_name, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_subtypes_share_a_category() {
        assert_eq!(
            DeviceCategory::classify(DeviceType::UsbDevice),
            Some(DeviceCategory::UsbAudio)
        );
        assert_eq!(
            DeviceCategory::classify(DeviceType::UsbHeadset),
            Some(DeviceCategory::UsbAudio)
        );
    }

    #[test]
    fn test_unrecognized_types_fall_back_to_other_for_routing() {
        assert_eq!(DeviceCategory::classify(DeviceType::Telephony), None);
        assert_eq!(
            DeviceCategory::for_routing(DeviceType::Unknown(999)),
            DeviceCategory::Other
        );
        assert_eq!(
            DeviceCategory::for_routing(DeviceType::BluetoothSco),
            DeviceCategory::Bluetooth
        );
    }

    #[test]
    fn test_type_codes_round_trip_through_known_values() {
        for code in [3, 5, 6, 7, 9, 11, 15, 16, 17, 18, 22, 25, 26, 42] {
            assert_eq!(DeviceType::from_code(code).code(), code);
        }
        assert_eq!(DeviceType::from_code(7), DeviceType::BluetoothSco);
        assert_eq!(DeviceType::from_code(42), DeviceType::Unknown(42));
    }

    #[test]
    fn test_display_name_uses_human_label() {
        let device = PlatformDevice::new(4u32, "Jabra Evolve", DeviceType::UsbHeadset);
        let input = InputDevice::from_platform(device).unwrap();
        assert_eq!(input.display_name, "Jabra Evolve (USB Audio)");
        assert_eq!(input.id, DeviceId::from(4u32));
        assert_eq!(input.category, DeviceCategory::UsbAudio);
    }

    #[test]
    fn test_hdmi_is_not_selectable() {
        let device = PlatformDevice::new(9u32, "TV", DeviceType::Hdmi);
        assert!(InputDevice::from_platform(device).is_none());
    }
}
