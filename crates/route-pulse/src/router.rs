//! Bluetooth voice routing on PulseAudio / PipeWire-pulse
//!
//! The platform calls map onto the sound server as follows:
//!
//! | call                        | pactl                                         |
//! |-----------------------------|-----------------------------------------------|
//! | start Bluetooth link        | switch Bluetooth cards to a headset profile  |
//! | stop Bluetooth link         | restore the profiles saved at start          |
//! | Bluetooth routing on        | make a Bluetooth source the default source   |
//! | Bluetooth routing off       | restore the default source saved at "on"     |
//! | is Bluetooth routing on     | is the default source a Bluetooth source     |

use std::thread;
use std::time::Duration;

use inputroute_core::AudioRouter;

use crate::model::{is_bluetooth_source_name, Source};
use crate::pactl::Pactl;

/// Delay between checks for a Bluetooth source after a profile switch
pub const SOURCE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Checks before giving up on a Bluetooth source appearing
pub const SOURCE_POLL_ATTEMPTS: usize = 10;

/// [`AudioRouter`] backed by `pactl`.
///
/// Failed commands are logged and not retried.
#[derive(Debug)]
pub struct PulseRouter {
    pactl: Pactl,
    headset_profiles: Vec<String>,
    saved_profiles: Vec<(String, String)>,
    saved_default_source: Option<String>,
}

impl PulseRouter {
    pub fn new(pactl: Pactl, headset_profiles: Vec<String>) -> Self {
        Self {
            pactl,
            headset_profiles,
            saved_profiles: Vec::new(),
            saved_default_source: None,
        }
    }

    fn sources(&self) -> Vec<Source> {
        self.pactl.list_sources().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to list sources");
            Vec::new()
        })
    }

    /// Profile switches are asynchronous on PipeWire; the source shows up
    /// shortly after.
    fn wait_for_bluetooth_source(&self) -> Option<String> {
        for attempt in 0..SOURCE_POLL_ATTEMPTS {
            let found = self
                .sources()
                .into_iter()
                .find(|source| source.is_bluetooth() && !source.is_monitor());
            if let Some(source) = found {
                return Some(source.name);
            }
            if attempt + 1 < SOURCE_POLL_ATTEMPTS {
                thread::sleep(SOURCE_POLL_INTERVAL);
            }
        }
        None
    }

    /// First non-Bluetooth input, for when the saved default is gone.
    fn fallback_source(&self) -> Option<String> {
        self.sources()
            .into_iter()
            .find(|source| !source.is_monitor() && !source.is_bluetooth())
            .map(|source| source.name)
    }

    fn set_default_source(&self, name: &str) {
        match self.pactl.set_default_source(name) {
            Ok(()) => tracing::debug!(source = name, "Default source set"),
            Err(e) => tracing::warn!(source = name, error = %e, "Failed to set default source"),
        }
    }

    fn set_card_profile(&self, card: &str, profile: &str) -> bool {
        match self.pactl.set_card_profile(card, profile) {
            Ok(()) => {
                tracing::debug!(card, profile, "Card profile set");
                true
            }
            Err(e) => {
                tracing::warn!(card, profile, error = %e, "Failed to set card profile");
                false
            }
        }
    }
}

impl AudioRouter for PulseRouter {
    fn start_bluetooth_link(&mut self) {
        let cards = match self.pactl.list_cards() {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list cards, Bluetooth link not started");
                return;
            }
        };

        for card in cards.iter().filter(|card| card.is_bluetooth()) {
            let Some(profile) = card.headset_profile(&self.headset_profiles) else {
                tracing::debug!(card = %card.name, "No headset profile available");
                continue;
            };
            if card.active_profile.as_deref() == Some(profile) {
                continue;
            }
            if self.set_card_profile(&card.name, profile) {
                if let Some(previous) = &card.active_profile {
                    let already_saved = self.saved_profiles.iter().any(|(name, _)| *name == card.name);
                    if !already_saved {
                        self.saved_profiles.push((card.name.clone(), previous.clone()));
                    }
                }
            }
        }
    }

    fn stop_bluetooth_link(&mut self) {
        if !self.saved_profiles.is_empty() {
            for (card, profile) in std::mem::take(&mut self.saved_profiles) {
                self.set_card_profile(&card, &profile);
            }
            return;
        }

        // Link was started elsewhere: drop any headset profile to media.
        let cards = match self.pactl.list_cards() {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list cards, Bluetooth link not stopped");
                return;
            }
        };
        for card in cards
            .iter()
            .filter(|card| card.is_bluetooth() && card.is_in_headset_profile(&self.headset_profiles))
        {
            if let Some(media) = card.media_profile() {
                self.set_card_profile(&card.name, media);
            }
        }
    }

    fn set_bluetooth_routing_on(&mut self, on: bool) {
        if on {
            let Some(source) = self.wait_for_bluetooth_source() else {
                tracing::warn!("No Bluetooth input source appeared, routing unchanged");
                return;
            };
            if self.saved_default_source.is_none() {
                self.saved_default_source = self
                    .pactl
                    .default_source()
                    .ok()
                    .filter(|name| !is_bluetooth_source_name(name));
            }
            self.set_default_source(&source);
            return;
        }

        let sources = self.sources();
        let saved = self
            .saved_default_source
            .take()
            .filter(|saved| sources.iter().any(|source| source.name == *saved));
        match saved.or_else(|| self.fallback_source()) {
            Some(source) => self.set_default_source(&source),
            None => tracing::warn!("No non-Bluetooth input source to restore"),
        }
    }

    fn is_bluetooth_routing_on(&self) -> bool {
        match self.pactl.default_source() {
            Ok(name) => is_bluetooth_source_name(&name),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to query default source");
                false
            }
        }
    }
}
