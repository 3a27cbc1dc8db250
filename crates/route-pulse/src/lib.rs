//! PulseAudio / PipeWire-pulse backend for inputroute
//!
//! Talks to the sound server through `pactl`, so it works unchanged on
//! native PulseAudio and on PipeWire with pipewire-pulse. The Bluetooth
//! voice link is the card's headset (HFP/HSP) profile.

mod device;
mod error;
mod model;
mod notify;
mod pactl;
mod platform;
mod router;

pub use device::{input_devices, PulseRegistry};
pub use error::PulseError;
pub use model::{parse_cards, parse_sources, Card, CardProfile, Source, DEFAULT_HEADSET_PROFILES};
pub use notify::{status_message, SystemdNotifier};
pub use pactl::{Pactl, DEFAULT_PACTL};
pub use platform::PulsePlatform;
pub use router::PulseRouter;
