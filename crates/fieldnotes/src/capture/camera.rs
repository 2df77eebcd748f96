//! Camera capture.
//!
//! A session owns at most one live stream. The stream is held by a guard
//! that stops every track when dropped, so ending the session by any path
//! (stop, reset, a second start, or dropping the session) releases the
//! hardware.

use async_trait::async_trait;
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::error::{Error, Result};

use super::failure_detail;
use super::snapshot::encode_jpeg_data_url;

/// Capability name used in errors and logs.
pub const CAMERA: &str = "camera";

/// Shown when the device has no camera.
pub const CAMERA_UNAVAILABLE_MESSAGE: &str = "Camera unavailable on this device.";

/// What a stream is requested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Request video tracks.
    pub video: bool,
    /// Request audio tracks.
    pub audio: bool,
}

impl StreamConstraints {
    /// Video without audio, as used for snapshots.
    #[must_use]
    pub fn video_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// A live capture stream.
pub trait MediaStream: Send {
    /// Frame dimensions reported by the stream, if known.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Grab the current frame, drawn at `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns an error if no frame can be read.
    fn grab_frame(&mut self, width: u32, height: u32) -> Result<RgbImage>;

    /// Stop every track of the stream. Must be idempotent.
    fn stop_tracks(&mut self);
}

/// A camera that can open streams.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// The name of this device (for logging).
    fn name(&self) -> &'static str;

    /// Whether the device has this capability at all.
    fn is_available(&self) -> bool;

    /// Acquire a stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be acquired, for example
    /// because permission was denied or the hardware is busy.
    async fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>>;
}

/// Owns a stream and stops it on drop.
struct StreamGuard(Box<dyn MediaStream>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.stop_tracks();
        debug!("Camera stream released");
    }
}

impl std::fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGuard")
            .field("dimensions", &self.0.dimensions())
            .finish()
    }
}

/// Lifecycle of the camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    /// No stream.
    Off,
    /// A stream is live and nothing has been captured from it.
    Streaming,
    /// A stream is live and a still has been captured.
    FrozenWithPhoto,
}

/// Snapshot parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSettings {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Frame size used when the stream reports none.
    pub fallback_size: (u32, u32),
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            fallback_size: (640, 480),
        }
    }
}

impl SnapshotSettings {
    /// Settings from the capture configuration.
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            fallback_size: (config.fallback_width, config.fallback_height),
        }
    }
}

/// A captured still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// JPEG data URI.
    pub data_url: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// The camera state machine for the note being composed.
#[derive(Debug, Default)]
pub struct CameraSession {
    stream: Option<StreamGuard>,
    photo: Option<Photo>,
    captured_from_stream: bool,
    error: Option<String>,
    settings: SnapshotSettings,
}

impl CameraSession {
    /// Create a session with the camera off.
    #[must_use]
    pub fn new(settings: SnapshotSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> CameraState {
        match (&self.stream, self.captured_from_stream) {
            (None, _) => CameraState::Off,
            (Some(_), false) => CameraState::Streaming,
            (Some(_), true) => CameraState::FrozenWithPhoto,
        }
    }

    /// Check whether a stream is live.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// The captured still, kept after the stream stops until reset.
    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    /// The last error message, if the last start failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Acquire a video stream from `device`.
    ///
    /// Any stream already held is released first.
    ///
    /// # Errors
    ///
    /// Returns an error if the device has no camera or acquisition fails;
    /// the user-facing message is available from [`CameraSession::error`].
    pub async fn start(&mut self, device: &dyn CameraDevice) -> Result<()> {
        self.error = None;

        if !device.is_available() {
            warn!("No camera available");
            self.error = Some(CAMERA_UNAVAILABLE_MESSAGE.to_string());
            return Err(Error::CaptureUnavailable { capability: CAMERA });
        }

        if self.stream.is_some() {
            debug!("Releasing previous camera stream before restarting");
            self.stop();
        }

        match device.open(StreamConstraints::video_only()).await {
            Ok(stream) => {
                info!("Camera stream started on {}", device.name());
                self.stream = Some(StreamGuard(stream));
                self.captured_from_stream = false;
                Ok(())
            }
            Err(err) => {
                warn!("Camera failed to start: {}", err);
                self.error = Some(format!(
                    "Could not start camera: {}",
                    failure_detail(&err)
                ));
                Err(err)
            }
        }
    }

    /// Capture the current frame as a JPEG still.
    ///
    /// Returns `Ok(None)` when no stream is live.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be read or encoded.
    pub fn snapshot(&mut self) -> Result<Option<&Photo>> {
        let Some(guard) = self.stream.as_mut() else {
            debug!("Snapshot requested without a live stream");
            return Ok(None);
        };

        let (width, height) = guard
            .0
            .dimensions()
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or(self.settings.fallback_size);

        let frame = guard.0.grab_frame(width, height)?;
        let data_url = encode_jpeg_data_url(&frame, self.settings.jpeg_quality)?;
        debug!(
            "Captured {}x{} snapshot ({} bytes)",
            width,
            height,
            data_url.len()
        );

        self.captured_from_stream = true;
        self.photo = Some(Photo {
            data_url,
            width,
            height,
        });
        Ok(self.photo.as_ref())
    }

    /// Release the stream. A captured still is kept.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Camera stopped");
        }
        self.captured_from_stream = false;
    }

    /// Release the stream and discard any captured still.
    pub fn reset(&mut self) {
        self.stop();
        self.photo = None;
        self.error = None;
    }
}
