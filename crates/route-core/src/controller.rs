//! Routing controller
//!
//! Front end of the routing service. [`RoutingController::start`] makes
//! sure a service is running and applies a category to it;
//! [`RoutingController::revert`] stops the service, which reverts routing.
//! Dropping the controller reverts as well.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::device::{DeviceCategory, InputDevice};
use crate::error::RouteError;
use crate::preference::{RoutingPreference, RoutingState};
use crate::service::ServiceHandle;
use crate::traits::{AudioPlatform, StatusText};

/// Owner of the applied routing preference.
///
/// All methods take `&self`; commands are serialized through the routing
/// service, so a controller can be shared across threads.
pub struct RoutingController<P: AudioPlatform> {
    platform: P,
    status_title: String,
    service: Mutex<Option<ServiceHandle>>,
}

impl<P: AudioPlatform> RoutingController<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            status_title: StatusText::DEFAULT_TITLE.to_string(),
            service: Mutex::new(None),
        }
    }

    /// Override the title of the host status indicator.
    pub fn with_status_title(mut self, title: impl Into<String>) -> Self {
        self.status_title = title.into();
        self
    }

    /// Apply `category` as the routing preference.
    ///
    /// Starts the routing service if it is not running. Calling again while
    /// active re-dispatches with the new category (last write wins), even
    /// when the category is unchanged.
    ///
    /// # Errors
    ///
    /// [`RouteError::AudioSubsystemUnavailable`] if the platform audio manager
    /// cannot be obtained. No routing call is made and no service is left
    /// running.
    pub fn start(&self, category: DeviceCategory) -> Result<RoutingState, RouteError> {
        self.start_with_status(category, category.label())
    }

    /// Apply the category of `device`, naming it in the status indicator.
    pub fn start_device(&self, device: &InputDevice) -> Result<RoutingState, RouteError> {
        self.start_with_status(device.category, &device.display_name)
    }

    fn start_with_status(
        &self,
        category: DeviceCategory,
        device_name: &str,
    ) -> Result<RoutingState, RouteError> {
        let status = StatusText::managing(device_name).with_title(self.status_title.clone());
        let mut service = self.lock_service();

        // A service that died has already torn down; reap it and start over.
        if service.as_ref().is_some_and(|handle| !handle.is_running()) {
            if let Some(dead) = service.take() {
                tracing::warn!("Routing service was not running, restarting");
                dead.stop();
            }
        }

        if service.is_none() {
            *service = Some(self.spawn_service()?);
        }
        let Some(handle) = service.as_mut() else {
            return Err(RouteError::ServiceStopped);
        };

        match handle.apply(category, status) {
            Ok(preference) => {
                let state = preference.state();
                tracing::info!(%category, %state, "Audio preference applied");
                Ok(state)
            }
            Err(e) => {
                tracing::error!(%category, error = %e, "Failed to apply audio preference");
                if let Some(dead) = service.take() {
                    dead.stop();
                }
                Err(e)
            }
        }
    }

    fn spawn_service(&self) -> Result<ServiceHandle, RouteError> {
        let router = self.platform.audio_router().map_err(|e| {
            tracing::error!(error = %e, "AudioManager not available");
            e
        })?;
        ServiceHandle::spawn(router, self.platform.elevation())
    }

    /// Stop the routing service, reverting any non-default routing.
    ///
    /// A no-op when nothing is running; never fails.
    pub fn revert(&self) {
        let handle = self.lock_service().take();
        match handle {
            Some(handle) => {
                tracing::info!("Reverting audio preference to default");
                handle.stop();
            }
            None => tracing::debug!("Revert requested with no routing service running"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_service()
            .as_ref()
            .is_some_and(ServiceHandle::is_running)
    }

    /// The last applied preference, or the inactive default.
    pub fn preference(&self) -> RoutingPreference {
        self.lock_service()
            .as_ref()
            .filter(|handle| handle.is_running())
            .map(|handle| handle.preference().clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> RoutingState {
        self.preference().state()
    }

    fn lock_service(&self) -> MutexGuard<'_, Option<ServiceHandle>> {
        self.service.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: AudioPlatform> Drop for RoutingController<P> {
    fn drop(&mut self) {
        self.revert();
    }
}
