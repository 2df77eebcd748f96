//! Capture providers available to the command-line client.
//!
//! A terminal has neither a location service nor a live camera, so the
//! client takes a fix the user types in and treats an image file as the
//! camera's video source. The `No*` providers stand in when a capability
//! is absent.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::imageops::FilterType;
use image::RgbImage;
use tracing::debug;

use crate::error::{Error, Result};
use crate::note::GeoPoint;

use super::camera::{CameraDevice, MediaStream, StreamConstraints, CAMERA};
use super::geo::{GeoOptions, Geolocator, GEOLOCATION};

/// A locator that always reports the same fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocator {
    point: GeoPoint,
}

impl FixedLocator {
    /// Create a locator for `point`.
    #[must_use]
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPoint> {
        let GeoPoint { lat, lon } = self.point;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::capture_failed(
                GEOLOCATION,
                format!("coordinates out of range: {lat}, {lon}"),
            ));
        }
        Ok(self.point)
    }
}

/// A device without geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocator;

#[async_trait]
impl Geolocator for NoLocator {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPoint> {
        Err(Error::CaptureUnavailable {
            capability: GEOLOCATION,
        })
    }
}

/// A camera whose video source is a still image file.
///
/// Each grabbed frame is the image drawn at the requested size.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// Use the image at `path` as the video source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the source image.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    fn name(&self) -> &'static str {
        "still-image"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>> {
        if !constraints.video {
            return Err(Error::capture_failed(CAMERA, "no video track requested"));
        }

        let path = self.path.clone();
        let source = tokio::task::spawn_blocking(move || {
            image::open(&path)
                .map(|img| img.to_rgb8())
                .map_err(|e| Error::ImageLoad {
                    path,
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| Error::internal(format!("image loader task failed: {e}")))??;

        debug!(
            "Opened still image source {} ({}x{})",
            self.path.display(),
            source.width(),
            source.height()
        );
        Ok(Box::new(StillImageStream { source, live: true }))
    }
}

/// Stream over a decoded still image.
#[derive(Debug)]
struct StillImageStream {
    source: RgbImage,
    live: bool,
}

impl MediaStream for StillImageStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some(self.source.dimensions())
    }

    fn grab_frame(&mut self, width: u32, height: u32) -> Result<RgbImage> {
        if !self.live {
            return Err(Error::capture_failed(CAMERA, "stream has been stopped"));
        }
        if self.source.dimensions() == (width, height) {
            return Ok(self.source.clone());
        }
        Ok(image::imageops::resize(
            &self.source,
            width,
            height,
            FilterType::Triangle,
        ))
    }

    fn stop_tracks(&mut self) {
        self.live = false;
    }
}

/// A device without a camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

#[async_trait]
impl CameraDevice for NoCamera {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn open(&self, _constraints: StreamConstraints) -> Result<Box<dyn MediaStream>> {
        Err(Error::CaptureUnavailable { capability: CAMERA })
    }
}
