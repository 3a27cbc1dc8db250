//! Background routing service
//!
//! The routing service is a dedicated thread that owns the platform router,
//! the foreground elevation handle and the [`RoutingPreference`]. Callers
//! reach it only through a command channel, so routing calls from different
//! callers never interleave.
//!
//! # Teardown
//!
//! The owned state lives in a [`ServiceGuard`] whose `Drop` reverts routing
//! and releases elevation. The guard is dropped exactly once on every exit
//! path of the thread:
//!
//! - an explicit [`Command::Stop`]
//! - the controller dropping its end of the channel
//! - a panic unwinding through the service loop

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::device::DeviceCategory;
use crate::error::RouteError;
use crate::preference::RoutingPreference;
use crate::traits::{AudioRouter, ForegroundElevation, StatusText};

/// Name of the routing service thread
pub const SERVICE_THREAD_NAME: &str = "routing-service";

pub(crate) enum Command {
    Apply {
        category: DeviceCategory,
        status: StatusText,
        reply: Sender<RoutingPreference>,
    },
    Stop,
}

struct ServiceGuard<R: AudioRouter, E: ForegroundElevation> {
    router: R,
    elevation: E,
    preference: RoutingPreference,
}

impl<R: AudioRouter, E: ForegroundElevation> ServiceGuard<R, E> {
    fn apply(&mut self, category: DeviceCategory, status: &StatusText) -> RoutingPreference {
        // Elevation must precede any routing call.
        self.elevation.elevate(status);
        self.preference.apply(&mut self.router, category);
        self.preference.clone()
    }
}

impl<R: AudioRouter, E: ForegroundElevation> Drop for ServiceGuard<R, E> {
    fn drop(&mut self) {
        let bluetooth_disabled = self.preference.revert(&mut self.router);
        self.elevation.release();
        tracing::info!(bluetooth_disabled, "Routing service destroyed, audio preferences reverted");
    }
}

/// Run the service loop until stopped or the channel closes.
fn run_service_loop<R: AudioRouter, E: ForegroundElevation>(
    mut guard: ServiceGuard<R, E>,
    commands: Receiver<Command>,
) {
    tracing::info!("Routing service started");

    while let Ok(command) = commands.recv() {
        match command {
            Command::Apply {
                category,
                status,
                reply,
            } => {
                let preference = guard.apply(category, &status);
                // The caller may have given up waiting; the preference stays applied.
                let _ = reply.send(preference);
            }
            Command::Stop => break,
        }
    }

    tracing::debug!("Routing service loop exited");
}

/// Controller-side handle to a running routing service.
pub(crate) struct ServiceHandle {
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
    preference: RoutingPreference,
}

impl ServiceHandle {
    pub(crate) fn spawn<R, E>(router: R, elevation: E) -> Result<Self, RouteError>
    where
        R: AudioRouter + 'static,
        E: ForegroundElevation + 'static,
    {
        let (commands, receiver) = mpsc::channel();
        let guard = ServiceGuard {
            router,
            elevation,
            preference: RoutingPreference::default(),
        };

        let thread = thread::Builder::new()
            .name(SERVICE_THREAD_NAME.to_string())
            .spawn(move || run_service_loop(guard, receiver))
            .map_err(|e| RouteError::ServiceSpawn(e.to_string()))?;

        Ok(Self {
            commands,
            thread: Some(thread),
            preference: RoutingPreference::default(),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map_or(false, |thread| !thread.is_finished())
    }

    pub(crate) fn preference(&self) -> &RoutingPreference {
        &self.preference
    }

    /// Send an apply command and wait for the service to finish it.
    pub(crate) fn apply(
        &mut self,
        category: DeviceCategory,
        status: StatusText,
    ) -> Result<RoutingPreference, RouteError> {
        let (reply, response) = mpsc::channel();
        self.commands
            .send(Command::Apply {
                category,
                status,
                reply,
            })
            .map_err(|_| RouteError::ServiceStopped)?;

        let preference = response.recv().map_err(|_| RouteError::ServiceStopped)?;
        self.preference = preference.clone();
        Ok(preference)
    }

    /// Stop the service and wait for its teardown to finish.
    pub(crate) fn stop(mut self) {
        // Fails only if the thread already exited, which has torn down too.
        let _ = self.commands.send(Command::Stop);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Routing service panicked; teardown ran during unwind");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPlatform, MockRouter, PlatformEvent, RouterCall};
    use crate::preference::RoutingState;
    use crate::traits::AudioPlatform;

    /// Router that panics on its second request to route to Bluetooth.
    struct PanickingRouter {
        inner: MockRouter,
        routing_requests: usize,
    }

    impl AudioRouter for PanickingRouter {
        fn start_bluetooth_link(&mut self) {
            self.inner.start_bluetooth_link();
        }

        fn stop_bluetooth_link(&mut self) {
            self.inner.stop_bluetooth_link();
        }

        fn set_bluetooth_routing_on(&mut self, on: bool) {
            if on {
                self.routing_requests += 1;
                if self.routing_requests == 2 {
                    panic!("router failure");
                }
            }
            self.inner.set_bluetooth_routing_on(on);
        }

        fn is_bluetooth_routing_on(&self) -> bool {
            self.inner.is_bluetooth_routing_on()
        }
    }

    fn spawn(platform: &MockPlatform) -> ServiceHandle {
        ServiceHandle::spawn(platform.audio_router().unwrap(), platform.elevation()).unwrap()
    }

    #[test]
    fn test_service_thread_is_named() {
        let platform = MockPlatform::new();
        let handle = spawn(&platform);
        let name = handle
            .thread
            .as_ref()
            .and_then(|t| t.thread().name().map(str::to_string));
        assert_eq!(name.as_deref(), Some(SERVICE_THREAD_NAME));
        handle.stop();
    }

    #[test]
    fn test_apply_elevates_before_routing() {
        let platform = MockPlatform::new();
        let mut handle = spawn(&platform);

        let preference = handle
            .apply(DeviceCategory::Bluetooth, StatusText::managing("AirPods"))
            .unwrap();

        assert_eq!(preference.state(), RoutingState::ActiveBluetooth);
        assert_eq!(handle.preference().state(), RoutingState::ActiveBluetooth);
        let events = platform.events();
        assert_eq!(events[0], PlatformEvent::Elevated(StatusText::managing("AirPods")));
        assert_eq!(events[1], PlatformEvent::Routing(RouterCall::StartBluetoothLink));
        handle.stop();
    }

    #[test]
    fn test_dropping_the_channel_tears_down() {
        let platform = MockPlatform::new();
        let mut handle = spawn(&platform);
        handle
            .apply(DeviceCategory::Bluetooth, StatusText::managing("AirPods"))
            .unwrap();

        let thread = handle.thread.take().unwrap();
        drop(handle);
        thread.join().unwrap();

        assert!(!platform.is_bluetooth_routing_on());
        assert_eq!(platform.events().last(), Some(&PlatformEvent::Released));
    }

    #[test]
    fn test_panic_in_router_tears_down() {
        let platform = MockPlatform::new();
        let router = PanickingRouter {
            inner: platform.audio_router().unwrap(),
            routing_requests: 0,
        };
        let mut handle = ServiceHandle::spawn(router, platform.elevation()).unwrap();

        handle
            .apply(DeviceCategory::Bluetooth, StatusText::managing("AirPods"))
            .unwrap();
        assert!(platform.is_bluetooth_routing_on());

        let result = handle.apply(DeviceCategory::Bluetooth, StatusText::managing("AirPods"));
        assert_eq!(result, Err(RouteError::ServiceStopped));

        handle.stop();
        assert!(!platform.is_bluetooth_routing_on());
        assert!(!platform.is_bluetooth_link_up());
        let released = platform
            .events()
            .iter()
            .filter(|e| **e == PlatformEvent::Released)
            .count();
        assert_eq!(released, 1);
    }

    #[test]
    fn test_stop_releases_elevation_once() {
        let platform = MockPlatform::new();
        let handle = spawn(&platform);
        handle.stop();

        let released = platform
            .events()
            .iter()
            .filter(|e| **e == PlatformEvent::Released)
            .count();
        assert_eq!(released, 1);
        assert!(platform.routing_calls().is_empty());
    }
}
