use crate::device::PlatformDevice;
use crate::error::RouteError;

/// Source of the devices currently attached to the host.
pub trait DeviceRegistry {
    /// List every attached device exposing input capability, in platform order.
    ///
    /// An empty list is a valid answer; `Err` means the registry itself
    /// could not be queried.
    fn list_input_devices(&self) -> Result<Vec<PlatformDevice>, RouteError>;
}

/// Platform routing switches for the Bluetooth voice (SCO) link.
///
/// Calls are treated as non-failing and are never retried; implementations
/// log their own transient failures.
pub trait AudioRouter: Send {
    fn start_bluetooth_link(&mut self);

    fn stop_bluetooth_link(&mut self);

    fn set_bluetooth_routing_on(&mut self, on: bool);

    fn is_bluetooth_routing_on(&self) -> bool;
}

/// Text shown by the host while the routing service is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    pub title: String,
    pub body: String,
}

impl StatusText {
    pub const DEFAULT_TITLE: &'static str = "Audio Manager Active";

    /// Status for a preference applied to `device_name`.
    pub fn managing(device_name: &str) -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            body: format!("Managing audio preference for: {}", device_name),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Keeps the routing service alive as user-visible ongoing work.
pub trait ForegroundElevation: Send {
    /// Raise the service to foreground-equivalent priority, or refresh the
    /// visible status if already raised.
    fn elevate(&mut self, status: &StatusText);

    /// Drop back to normal priority and remove the status indicator.
    fn release(&mut self);
}

/// Factory for the capabilities the routing controller consumes.
pub trait AudioPlatform: Send + Sync + 'static {
    type Router: AudioRouter + 'static;
    type Elevation: ForegroundElevation + 'static;

    /// Acquire the platform audio manager.
    ///
    /// Fails with [`RouteError::AudioSubsystemUnavailable`] when there is none.
    fn audio_router(&self) -> Result<Self::Router, RouteError>;

    fn elevation(&self) -> Self::Elevation;
}
