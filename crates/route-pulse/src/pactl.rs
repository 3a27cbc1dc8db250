//! Thin wrapper around the `pactl` command-line tool
//!
//! Works against native PulseAudio and against PipeWire through
//! pipewire-pulse. JSON output (`-f json`) needs pactl 16 or newer.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::de::DeserializeOwned;

use crate::error::PulseError;
use crate::model::{Card, Source};

pub const DEFAULT_PACTL: &str = "pactl";

#[derive(Debug, Clone)]
pub struct Pactl {
    program: PathBuf,
}

impl Default for Pactl {
    fn default() -> Self {
        Self::new(DEFAULT_PACTL)
    }
}

impl Pactl {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    /// Run pactl and return its stdout.
    pub fn run(&self, args: &[&str]) -> Result<String, PulseError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| PulseError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(PulseError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, PulseError> {
        let mut full = vec!["-f", "json"];
        full.extend_from_slice(args);
        let stdout = self.run(&full)?;
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Check that a sound server answers.
    pub fn check_available(&self) -> Result<(), PulseError> {
        self.run(&["info"]).map(|_| ())
    }

    pub fn list_sources(&self) -> Result<Vec<Source>, PulseError> {
        self.json(&["list", "sources"])
    }

    pub fn list_cards(&self) -> Result<Vec<Card>, PulseError> {
        self.json(&["list", "cards"])
    }

    pub fn default_source(&self) -> Result<String, PulseError> {
        Ok(self.run(&["get-default-source"])?.trim().to_string())
    }

    pub fn set_default_source(&self, name: &str) -> Result<(), PulseError> {
        self.run(&["set-default-source", name]).map(|_| ())
    }

    pub fn set_card_profile(&self, card: &str, profile: &str) -> Result<(), PulseError> {
        self.run(&["set-card-profile", card, profile]).map(|_| ())
    }
}
