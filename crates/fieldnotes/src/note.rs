//! Core note types for fieldnotes.
//!
//! This module defines the note record and the location fix attached to it,
//! together with their canonical persisted form.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Display text used when a note carries no location.
pub const NO_LOCATION_TEXT: &str = "—";

/// A geolocation fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Format the point the way it is shown next to a note: six decimals,
    /// latitude first.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// A persisted note.
///
/// Serializes to the canonical record layout: `id`, `title`, `text`,
/// `createdAt` (epoch millis), `geo`, `geoText` and `photoDataUrl`.
/// Reading stored records goes through [`crate::notes::record`], which
/// also understands older image field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier.
    pub id: String,

    /// Title; may be empty when the note has text.
    #[serde(default)]
    pub title: String,

    /// Free text; may be empty when the note has a title.
    #[serde(default)]
    pub text: String,

    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,

    /// Location fix taken while composing the note.
    pub geo: Option<GeoPoint>,

    /// Human-readable location, `—` when there is none.
    pub geo_text: String,

    /// Snapshot as a `data:image/jpeg;base64,...` URI.
    pub photo_data_url: Option<String>,
}

impl Note {
    /// Create a note with no location and no photo.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            created_at,
            geo: None,
            geo_text: NO_LOCATION_TEXT.to_string(),
            photo_data_url: None,
        }
    }

    /// Attach a location fix, deriving the display text from it.
    #[must_use]
    pub fn with_geo(mut self, point: GeoPoint) -> Self {
        self.geo_text = point.display_text();
        self.geo = Some(point);
        self
    }

    /// Attach a photo data URI.
    #[must_use]
    pub fn with_photo(mut self, data_url: impl Into<String>) -> Self {
        self.photo_data_url = Some(data_url.into());
        self
    }

    /// Creation time as a UTC timestamp.
    ///
    /// Out-of-range millisecond values fall back to the epoch.
    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .unwrap_or_default()
    }

    /// Check whether the note has a photo attached.
    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.photo_data_url.is_some()
    }

    /// Check whether this note carries the given identifier.
    #[must_use]
    pub fn matches_id(&self, id: &str) -> bool {
        self.id == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_display_text() {
        let point = GeoPoint::new(52.23, 21.01);
        assert_eq!(point.display_text(), "52.230000, 21.010000");
        assert_eq!(point.to_string(), "52.230000, 21.010000");
    }

    #[test]
    fn test_geo_display_text_negative() {
        let point = GeoPoint::new(-33.868_82, 151.209_296);
        assert_eq!(point.display_text(), "-33.868820, 151.209296");
    }

    #[test]
    fn test_note_new_defaults() {
        let note = Note::new("a1", "Title", "", 1_700_000_000_000);

        assert_eq!(note.id, "a1");
        assert!(note.geo.is_none());
        assert_eq!(note.geo_text, NO_LOCATION_TEXT);
        assert!(!note.has_photo());
    }

    #[test]
    fn test_note_with_geo() {
        let note = Note::new("a1", "Trip", "", 0).with_geo(GeoPoint::new(52.23, 21.01));
        assert_eq!(note.geo, Some(GeoPoint::new(52.23, 21.01)));
        assert_eq!(note.geo_text, "52.230000, 21.010000");
    }

    #[test]
    fn test_note_created() {
        let note = Note::new("a1", "t", "", 1_700_000_000_123);
        assert_eq!(note.created().timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_note_serializes_canonical_names() {
        let note = Note::new("a1", "t", "x", 5).with_photo("data:image/jpeg;base64,AAAA");
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["createdAt"], 5);
        assert_eq!(json["geoText"], "—");
        assert_eq!(json["photoDataUrl"], "data:image/jpeg;base64,AAAA");
        assert!(json["geo"].is_null());
        assert!(json.get("photo").is_none());
    }

    #[test]
    fn test_matches_id() {
        let note = Note::new("42", "t", "", 0);
        assert!(note.matches_id("42"));
        assert!(!note.matches_id("4"));
    }
}
