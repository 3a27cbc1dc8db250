use inputroute_core::{AudioPlatform, DeviceRegistry, PlatformDevice, RouteError};

use crate::device::PulseRegistry;
use crate::model::DEFAULT_HEADSET_PROFILES;
use crate::notify::SystemdNotifier;
use crate::pactl::Pactl;
use crate::router::PulseRouter;

/// PulseAudio / PipeWire-pulse platform for the routing controller.
#[derive(Debug, Clone)]
pub struct PulsePlatform {
    pactl: Pactl,
    headset_profiles: Vec<String>,
}

impl Default for PulsePlatform {
    fn default() -> Self {
        Self::new(Pactl::default())
    }
}

impl PulsePlatform {
    pub fn new(pactl: Pactl) -> Self {
        Self {
            pactl,
            headset_profiles: DEFAULT_HEADSET_PROFILES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the headset profile preference order.
    ///
    /// An empty list keeps the built-in order.
    pub fn with_headset_profiles(mut self, profiles: Vec<String>) -> Self {
        if !profiles.is_empty() {
            self.headset_profiles = profiles;
        }
        self
    }

    pub fn registry(&self) -> PulseRegistry {
        PulseRegistry::new(self.pactl.clone(), self.headset_profiles.clone())
    }
}

impl DeviceRegistry for PulsePlatform {
    fn list_input_devices(&self) -> Result<Vec<PlatformDevice>, RouteError> {
        self.registry().list_input_devices()
    }
}

impl AudioPlatform for PulsePlatform {
    type Router = PulseRouter;
    type Elevation = SystemdNotifier;

    fn audio_router(&self) -> Result<PulseRouter, RouteError> {
        self.pactl.check_available()?;
        Ok(PulseRouter::new(self.pactl.clone(), self.headset_profiles.clone()))
    }

    fn elevation(&self) -> SystemdNotifier {
        SystemdNotifier::from_env()
    }
}
