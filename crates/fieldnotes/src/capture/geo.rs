//! Geolocation capture.
//!
//! A request moves the capture from idle to requesting and then to either
//! resolved or failed. There is no retry; the user triggers a new request.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::note::{GeoPoint, NO_LOCATION_TEXT};

use super::failure_detail;

/// Capability name used in errors and logs.
pub const GEOLOCATION: &str = "geolocation";

/// Shown while a request is outstanding.
pub const LOCATING_TEXT: &str = "Locating…";

/// Shown when the device has no location provider.
pub const GEO_UNAVAILABLE_MESSAGE: &str = "Geolocation unavailable on this device.";

/// Parameters passed to the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoOptions {
    /// Prefer the most accurate fix the provider can give.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl GeoOptions {
    /// Options from the capture configuration.
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_millis(config.geo_timeout_ms),
        }
    }
}

/// A source of location fixes.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// The name of this provider (for logging).
    fn name(&self) -> &'static str;

    /// Whether the device has this capability at all.
    fn is_available(&self) -> bool;

    /// Resolve the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position cannot be determined, for example
    /// because permission was denied.
    async fn current_position(&self, options: &GeoOptions) -> Result<GeoPoint>;
}

/// Where a geolocation capture stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GeoState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is outstanding.
    Requesting,
    /// A fix was obtained.
    Resolved {
        /// The fix.
        point: GeoPoint,
        /// The fix formatted for display.
        text: String,
    },
    /// The request failed.
    Failed {
        /// Message shown to the user.
        message: String,
    },
}

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoTicket(u64);

/// The geolocation state machine for the note being composed.
///
/// The last resolved fix outlives later requests and failures; only
/// [`GeoCapture::reset`] forgets it.
#[derive(Debug, Default)]
pub struct GeoCapture {
    state: GeoState,
    last_fix: Option<(GeoPoint, String)>,
    generation: u64,
    options: GeoOptions,
}

impl GeoCapture {
    /// Create an idle capture.
    #[must_use]
    pub fn new(options: GeoOptions) -> Self {
        Self {
            state: GeoState::Idle,
            last_fix: None,
            generation: 0,
            options,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &GeoState {
        &self.state
    }

    /// The options used for requests.
    #[must_use]
    pub fn options(&self) -> GeoOptions {
        self.options
    }

    /// The most recent resolved fix, if any.
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        self.last_fix.as_ref().map(|(point, _)| *point)
    }

    /// Text to store on a note: the formatted fix, or `—`.
    #[must_use]
    pub fn note_text(&self) -> &str {
        self.last_fix
            .as_ref()
            .map_or(NO_LOCATION_TEXT, |(_, text)| text.as_str())
    }

    /// Text for the location output of the form.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match &self.state {
            GeoState::Idle => NO_LOCATION_TEXT,
            GeoState::Requesting => LOCATING_TEXT,
            GeoState::Resolved { text, .. } => text,
            GeoState::Failed { message } => message,
        }
    }

    /// Start a request against `locator`.
    ///
    /// Returns `None` and moves to failed if the capability is missing.
    pub fn begin(&mut self, locator: &dyn Geolocator) -> Option<GeoTicket> {
        if !locator.is_available() {
            warn!("No geolocation provider available");
            self.state = GeoState::Failed {
                message: GEO_UNAVAILABLE_MESSAGE.to_string(),
            };
            return None;
        }

        self.generation += 1;
        self.state = GeoState::Requesting;
        debug!(
            "Requesting position from {} (high accuracy: {})",
            locator.name(),
            self.options.high_accuracy
        );
        Some(GeoTicket(self.generation))
    }

    /// Record the outcome of the request identified by `ticket`.
    ///
    /// Outcomes of requests superseded by a later request or a reset are
    /// discarded; returns whether the outcome was applied.
    pub fn complete(&mut self, ticket: GeoTicket, outcome: Result<GeoPoint>) -> bool {
        if ticket.0 != self.generation || self.state != GeoState::Requesting {
            debug!("Discarding stale geolocation result");
            return false;
        }

        self.state = match outcome {
            Ok(point) => {
                info!("Resolved position {}", point);
                let text = point.display_text();
                self.last_fix = Some((point, text.clone()));
                GeoState::Resolved { point, text }
            }
            Err(err) => {
                warn!("Geolocation failed: {}", err);
                GeoState::Failed {
                    message: format!("Geolocation error: {}", failure_detail(&err)),
                }
            }
        };
        true
    }

    /// Request a fix and wait for it, bounded by the configured timeout.
    pub async fn request(&mut self, locator: &dyn Geolocator) -> &GeoState {
        let Some(ticket) = self.begin(locator) else {
            return &self.state;
        };

        let options = self.options;
        let outcome = match tokio::time::timeout(
            options.timeout,
            locator.current_position(&options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::CaptureTimeout {
                capability: GEOLOCATION,
                millis: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        self.complete(ticket, outcome);
        &self.state
    }

    /// Forget any fix or failure. Outstanding requests become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = GeoState::Idle;
        self.last_fix = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::devices::{FixedLocator, NoLocator};

    struct DeniedLocator;

    #[async_trait]
    impl Geolocator for DeniedLocator {
        fn name(&self) -> &'static str {
            "denied"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPoint> {
            Err(Error::capture_failed(GEOLOCATION, "User denied Geolocation"))
        }
    }

    struct HangingLocator;

    #[async_trait]
    impl Geolocator for HangingLocator {
        fn name(&self) -> &'static str {
            "hanging"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPoint> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_default_options() {
        let options = GeoOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_idle_display() {
        let capture = GeoCapture::default();
        assert_eq!(capture.state(), &GeoState::Idle);
        assert_eq!(capture.display_text(), "—");
        assert_eq!(capture.note_text(), "—");
        assert!(capture.point().is_none());
    }

    #[tokio::test]
    async fn test_request_resolves() {
        let mut capture = GeoCapture::new(GeoOptions::default());
        let locator = FixedLocator::new(GeoPoint::new(52.23, 21.01));

        capture.request(&locator).await;

        assert_eq!(capture.point(), Some(GeoPoint::new(52.23, 21.01)));
        assert_eq!(capture.display_text(), "52.230000, 21.010000");
        assert_eq!(capture.note_text(), "52.230000, 21.010000");
    }

    #[tokio::test]
    async fn test_request_unavailable() {
        let mut capture = GeoCapture::default();
        capture.request(&NoLocator).await;

        assert_eq!(
            capture.state(),
            &GeoState::Failed {
                message: GEO_UNAVAILABLE_MESSAGE.to_string()
            }
        );
        assert_eq!(capture.note_text(), "—");
    }

    #[tokio::test]
    async fn test_request_denied_reports_message() {
        let mut capture = GeoCapture::default();
        capture.request(&DeniedLocator).await;

        assert_eq!(
            capture.display_text(),
            "Geolocation error: User denied Geolocation"
        );
        assert!(capture.point().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_times_out() {
        let mut capture = GeoCapture::default();
        capture.request(&HangingLocator).await;

        assert_eq!(
            capture.display_text(),
            "Geolocation error: timed out after 10s"
        );
    }

    #[tokio::test]
    async fn test_failed_request_keeps_previous_fix() {
        let mut capture = GeoCapture::default();
        capture
            .request(&FixedLocator::new(GeoPoint::new(52.23, 21.01)))
            .await;
        capture.request(&DeniedLocator).await;

        assert_eq!(
            capture.display_text(),
            "Geolocation error: User denied Geolocation"
        );
        assert_eq!(capture.point(), Some(GeoPoint::new(52.23, 21.01)));
        assert_eq!(capture.note_text(), "52.230000, 21.010000");

        capture.reset();
        assert!(capture.point().is_none());
        assert_eq!(capture.note_text(), "—");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_times_out_below_one_second() {
        let mut capture = GeoCapture::new(GeoOptions {
            high_accuracy: false,
            timeout: Duration::from_millis(500),
        });
        capture.request(&HangingLocator).await;

        assert_eq!(
            capture.display_text(),
            "Geolocation error: timed out after 500ms"
        );
    }

    #[test]
    fn test_begin_sets_requesting() {
        let mut capture = GeoCapture::default();
        let ticket = capture.begin(&FixedLocator::new(GeoPoint::new(0.0, 0.0)));

        assert!(ticket.is_some());
        assert_eq!(capture.state(), &GeoState::Requesting);
        assert_eq!(capture.display_text(), LOCATING_TEXT);
    }

    #[test]
    fn test_stale_result_after_reset_is_ignored() {
        let mut capture = GeoCapture::default();
        let ticket = capture
            .begin(&FixedLocator::new(GeoPoint::new(1.0, 2.0)))
            .unwrap();
        capture.reset();

        let applied = capture.complete(ticket, Ok(GeoPoint::new(1.0, 2.0)));
        assert!(!applied);
        assert_eq!(capture.state(), &GeoState::Idle);
    }

    #[test]
    fn test_superseded_request_is_ignored() {
        let mut capture = GeoCapture::default();
        let locator = FixedLocator::new(GeoPoint::new(1.0, 2.0));
        let first = capture.begin(&locator).unwrap();
        let second = capture.begin(&locator).unwrap();

        assert!(!capture.complete(first, Ok(GeoPoint::new(9.0, 9.0))));
        assert!(capture.complete(second, Ok(GeoPoint::new(1.0, 2.0))));
        assert_eq!(capture.point(), Some(GeoPoint::new(1.0, 2.0)));
    }
}
