//! Input device preference routing
//!
//! - [`DeviceCatalog`] lists the attached input devices a user can pick.
//! - [`RoutingController`] applies a picked device's [`DeviceCategory`] to
//!   platform routing and reverts it on [`RoutingController::revert`] or
//!   teardown.
//!
//! Platform access goes through the traits in this crate, so the routing
//! state machine runs unchanged against a real sound server or
//! [`mock::MockPlatform`].

mod catalog;
mod controller;
mod device;
mod error;
pub mod mock;
mod preference;
mod service;
mod traits;

pub use catalog::{select_device, DeviceCatalog};
pub use controller::RoutingController;
pub use device::{DeviceCategory, DeviceId, DeviceType, InputDevice, PlatformDevice};
pub use error::RouteError;
pub use preference::{RoutingPreference, RoutingState};
pub use service::SERVICE_THREAD_NAME;
pub use traits::{AudioPlatform, AudioRouter, DeviceRegistry, ForegroundElevation, StatusText};
