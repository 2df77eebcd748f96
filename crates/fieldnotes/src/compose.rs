//! The note creation form.
//!
//! A [`NoteForm`] holds the title and text being typed plus the transient
//! geolocation and camera captures. Saving validates the input, persists a
//! new note at the front of the collection and resets the form.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};
use uuid::Uuid;

use crate::capture::{CameraSession, GeoCapture, GeoOptions, SnapshotSettings};
use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::note::Note;
use crate::notes::NotesRepository;
use crate::router::View;
use crate::storage::KeyValueStore;

/// Shown when both title and text are blank.
pub const EMPTY_NOTE_MESSAGE: &str = "Add a title or description.";

/// Shown after a successful save.
pub const SAVED_MESSAGE: &str = "Saved ✅";

/// How new note identifiers are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdSource {
    /// A random UUID.
    #[default]
    Random,
    /// The creation time in milliseconds, as a decimal string.
    Timestamp,
}

impl IdSource {
    /// Generate an identifier for a note created at `now_millis`.
    #[must_use]
    pub fn generate(self, now_millis: i64) -> String {
        match self {
            Self::Random => Uuid::new_v4().to_string(),
            Self::Timestamp => now_millis.to_string(),
        }
    }
}

impl fmt::Display for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl FromStr for IdSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Self::Random),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(Error::validation(format!("unknown id source: {other}"))),
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The note that was persisted.
    pub note: Note,
    /// Confirmation message.
    pub message: &'static str,
    /// The view to show next.
    pub navigate_to: View,
}

/// The note creation form.
#[derive(Debug, Default)]
pub struct NoteForm {
    /// Title input.
    pub title: String,
    /// Text input.
    pub text: String,
    geo: GeoCapture,
    camera: CameraSession,
    message: Option<String>,
}

impl NoteForm {
    /// Create an empty form.
    #[must_use]
    pub fn new(geo_options: GeoOptions, snapshot: SnapshotSettings) -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            geo: GeoCapture::new(geo_options),
            camera: CameraSession::new(snapshot),
            message: None,
        }
    }

    /// Create an empty form from the capture configuration.
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            GeoOptions::from_config(config),
            SnapshotSettings::from_config(config),
        )
    }

    /// The geolocation capture.
    #[must_use]
    pub fn geo(&self) -> &GeoCapture {
        &self.geo
    }

    /// The geolocation capture, mutably.
    pub fn geo_mut(&mut self) -> &mut GeoCapture {
        &mut self.geo
    }

    /// The camera session.
    #[must_use]
    pub fn camera(&self) -> &CameraSession {
        &self.camera
    }

    /// The camera session, mutably.
    pub fn camera_mut(&mut self) -> &mut CameraSession {
        &mut self.camera
    }

    /// The status message below the save button.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Set or clear the status message.
    pub fn set_message(&mut self, message: Option<String>) {
        self.message = message;
    }

    /// Trimmed title and text, or an error if both are blank.
    ///
    /// # Errors
    ///
    /// Returns a validation error carrying [`EMPTY_NOTE_MESSAGE`].
    pub fn validate(&self) -> Result<(&str, &str)> {
        let title = self.title.trim();
        let text = self.text.trim();
        if title.is_empty() && text.is_empty() {
            return Err(Error::validation(EMPTY_NOTE_MESSAGE));
        }
        Ok((title, text))
    }

    /// Build the note the form currently describes.
    ///
    /// # Errors
    ///
    /// Returns a validation error if both title and text are blank.
    pub fn build_note(&self, id_source: IdSource, now_millis: i64) -> Result<Note> {
        let (title, text) = self.validate()?;
        let mut note = Note::new(id_source.generate(now_millis), title, text, now_millis);
        if let Some(point) = self.geo.point() {
            note = note.with_geo(point);
        }
        if let Some(photo) = self.camera.photo() {
            note = note.with_photo(photo.data_url.clone());
        }
        Ok(note)
    }

    /// Validate, persist and reset.
    ///
    /// On a validation failure nothing is written and the form keeps its
    /// input; the message is set to [`EMPTY_NOTE_MESSAGE`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank input, or a storage error if the
    /// note could not be persisted.
    pub fn save<S: KeyValueStore>(
        &mut self,
        repo: &NotesRepository<S>,
        id_source: IdSource,
        now_millis: i64,
    ) -> Result<SaveOutcome> {
        let note = match self.build_note(id_source, now_millis) {
            Ok(note) => note,
            Err(err) => {
                debug!("Rejected empty note");
                self.message = Some(err.to_string());
                return Err(err);
            }
        };

        repo.add(note.clone())?;
        info!(
            "Saved note {} (location: {}, photo: {})",
            note.id,
            note.geo.is_some(),
            note.has_photo()
        );

        self.reset();
        self.message = Some(SAVED_MESSAGE.to_string());
        Ok(SaveOutcome {
            note,
            message: SAVED_MESSAGE,
            navigate_to: View::Home,
        })
    }

    /// Clear the inputs and captures and release the camera.
    pub fn reset(&mut self) {
        self.title.clear();
        self.text.clear();
        self.geo.reset();
        self.camera.reset();
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FixedLocator;
    use crate::note::GeoPoint;
    use crate::storage::MemoryStore;

    fn repo() -> NotesRepository<MemoryStore> {
        NotesRepository::new(MemoryStore::new(), "pwa_notes_v1")
    }

    #[test]
    fn test_id_source_generate() {
        assert_eq!(IdSource::Timestamp.generate(1_700_000_000_000), "1700000000000");

        let a = IdSource::Random.generate(0);
        let b = IdSource::Random.generate(0);
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_id_source_parse() {
        assert_eq!("random".parse::<IdSource>().unwrap(), IdSource::Random);
        assert_eq!("timestamp".parse::<IdSource>().unwrap(), IdSource::Timestamp);
        assert!("sequential".parse::<IdSource>().is_err());
        assert_eq!(IdSource::Timestamp.to_string(), "timestamp");
    }

    #[test]
    fn test_blank_input_writes_nothing() {
        let repo = repo();
        let mut form = NoteForm::default();
        form.title = "   ".to_string();
        form.text = "\n\t".to_string();

        let err = form.save(&repo, IdSource::Random, 1).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), EMPTY_NOTE_MESSAGE);
        assert_eq!(form.message(), Some(EMPTY_NOTE_MESSAGE));
        assert_eq!(form.title, "   ");
        assert!(repo.store().is_empty().unwrap());
    }

    #[test]
    fn test_input_is_trimmed() {
        let mut form = NoteForm::default();
        form.title = "  Trip ".to_string();
        form.text = " notes\n".to_string();

        let note = form.build_note(IdSource::Timestamp, 5).unwrap();
        assert_eq!(note.title, "Trip");
        assert_eq!(note.text, "notes");
        assert_eq!(note.id, "5");
        assert_eq!(note.geo_text, "—");
        assert!(note.photo_data_url.is_none());
    }

    #[tokio::test]
    async fn test_trip_scenario() {
        let repo = repo();
        let mut form = NoteForm::default();
        form.title = "Trip".to_string();
        form.geo_mut()
            .request(&FixedLocator::new(GeoPoint::new(52.23, 21.01)))
            .await;

        let outcome = form.save(&repo, IdSource::Random, 1_000).unwrap();

        assert_eq!(outcome.message, "Saved ✅");
        assert_eq!(outcome.navigate_to, View::Home);
        assert_eq!(outcome.note.title, "Trip");
        assert_eq!(outcome.note.text, "");
        assert_eq!(outcome.note.geo, Some(GeoPoint::new(52.23, 21.01)));
        assert_eq!(outcome.note.geo_text, "52.230000, 21.010000");

        let stored = repo.load().unwrap();
        assert_eq!(stored, vec![outcome.note]);

        // Form is cleared for the next note.
        assert!(form.title.is_empty());
        assert!(form.geo().point().is_none());
        assert_eq!(form.message(), Some(SAVED_MESSAGE));
    }

    #[test]
    fn test_two_saves_newest_first() {
        let repo = repo();
        let mut form = NoteForm::default();

        form.title = "first".to_string();
        form.save(&repo, IdSource::Random, 1).unwrap();
        form.title = "second".to_string();
        form.save(&repo, IdSource::Random, 2).unwrap();

        let titles: Vec<_> = repo.load().unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = NoteForm::default();
        form.title = "t".to_string();
        form.text = "x".to_string();
        form.set_message(Some("hello".to_string()));

        form.reset();

        assert!(form.title.is_empty());
        assert!(form.text.is_empty());
        assert!(form.message().is_none());
        assert!(!form.camera().is_streaming());
        assert!(form.camera().photo().is_none());
    }
}
