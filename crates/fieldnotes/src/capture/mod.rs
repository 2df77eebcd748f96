//! Transient capture state for the note being composed.
//!
//! Two independent state machines live here: [`GeoCapture`] for a location
//! fix and [`CameraSession`] for a camera snapshot. Both talk to hardware
//! through traits ([`Geolocator`], [`CameraDevice`]) so the concrete
//! providers in [`devices`] can be swapped for fakes.

pub mod camera;
pub mod devices;
pub mod geo;
pub mod snapshot;

use crate::error::{describe_millis, Error};

pub use camera::{
    CameraDevice, CameraSession, CameraState, MediaStream, Photo, SnapshotSettings,
    StreamConstraints,
};
pub use devices::{FixedLocator, NoCamera, NoLocator, StillImageCamera};
pub use geo::{GeoCapture, GeoOptions, GeoState, GeoTicket, Geolocator};

/// The part of a capture error worth showing after a prefix such as
/// `Geolocation error:`.
pub(crate) fn failure_detail(err: &Error) -> String {
    match err {
        Error::CaptureFailed { message, .. } => message.clone(),
        Error::CaptureTimeout { millis, .. } => {
            format!("timed out after {}", describe_millis(millis))
        }
        other => other.to_string(),
    }
}
