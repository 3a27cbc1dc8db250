use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The platform audio manager could not be obtained. Terminal for the
    /// current `start` attempt.
    #[error("Audio subsystem unavailable: {0}")]
    AudioSubsystemUnavailable(String),

    #[error("No input devices found")]
    NoDevicesFound,

    #[error("No device selected or available")]
    NoSelectionMade,

    #[error("Routing service stopped unexpectedly")]
    ServiceStopped,

    #[error("Failed to spawn routing service: {0}")]
    ServiceSpawn(String),
}
