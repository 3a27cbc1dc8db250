use inputroute_core::RouteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pactl {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unexpected pactl output: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<PulseError> for RouteError {
    fn from(error: PulseError) -> Self {
        RouteError::AudioSubsystemUnavailable(error.to_string())
    }
}
