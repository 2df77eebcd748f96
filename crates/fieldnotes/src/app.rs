//! The user action surface.
//!
//! [`App`] ties the router, the notes repository, the creation form and the
//! capture providers together. Every user action is an [`Action`] passed to
//! [`App::dispatch`]; the page is re-rendered from state afterwards.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info};

use crate::capture::{failure_detail, CameraDevice, Geolocator, NoCamera, NoLocator};
use crate::compose::{IdSource, NoteForm};
use crate::config::Config;
use crate::error::Result;
use crate::network::{Connectivity, OfflineBanner};
use crate::note::Note;
use crate::notes::NotesRepository;
use crate::render::{FormView, Page, Renderer};
use crate::router::{Router, View};
use crate::storage::KeyValueStore;

/// Question asked before a note is deleted.
pub const DELETE_PROMPT: &str = "Delete this note?";

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    /// Return `true` if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Agrees to everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Follow a location fragment such as `#/add`.
    Navigate(String),
    /// The network status changed.
    SetConnectivity(Connectivity),
    /// Replace the title input.
    EditTitle(String),
    /// Replace the text input.
    EditText(String),
    /// Ask for a location fix.
    RequestLocation,
    /// Start the camera.
    StartCamera,
    /// Capture a still from the camera.
    TakeSnapshot,
    /// Stop the camera.
    StopCamera,
    /// Save the form as a new note.
    SaveNote,
    /// Delete the note with this id, after confirmation.
    DeleteNote(String),
    /// Remove every note.
    ClearAll,
}

/// What an action did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed with nothing to report.
    Done,
    /// An inline message for the user (capture or validation failure).
    Message(String),
    /// A note was saved.
    Saved(Note),
    /// Notes matching the id were removed.
    Deleted(usize),
    /// All notes were removed.
    Cleared,
    /// The user declined the confirmation; nothing changed.
    Declined,
}

/// The application.
pub struct App<S> {
    repo: NotesRepository<S>,
    router: Router,
    banner: OfflineBanner,
    form: NoteForm,
    locator: Box<dyn Geolocator>,
    camera: Box<dyn CameraDevice>,
    confirm: Box<dyn Confirm>,
    renderer: Renderer,
    id_source: IdSource,
}

impl<S: KeyValueStore> fmt::Debug for App<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("key", &self.repo.key())
            .field("view", &self.router.current())
            .field("banner", &self.banner)
            .field("form", &self.form)
            .field("locator", &self.locator.name())
            .field("camera", &self.camera.name())
            .field("id_source", &self.id_source)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> App<S> {
    /// Create an application over `store` with no capture hardware.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            repo: NotesRepository::new(store, config.storage.notes_key.clone()),
            router: Router::new(),
            banner: OfflineBanner::default(),
            form: NoteForm::from_config(&config.capture),
            locator: Box::new(NoLocator),
            camera: Box::new(NoCamera),
            confirm: Box::new(AlwaysConfirm),
            renderer: Renderer::from_config(&config.render),
            id_source: IdSource::default(),
        }
    }

    /// Use `locator` for location requests.
    #[must_use]
    pub fn with_locator(mut self, locator: impl Geolocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Use `camera` as the video source.
    #[must_use]
    pub fn with_camera(mut self, camera: impl CameraDevice + 'static) -> Self {
        self.camera = Box::new(camera);
        self
    }

    /// Ask `confirm` before deleting a note.
    #[must_use]
    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    /// Render with `renderer`.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Generate ids from `id_source`.
    #[must_use]
    pub fn with_id_source(mut self, id_source: IdSource) -> Self {
        self.id_source = id_source;
        self
    }

    /// The notes repository.
    #[must_use]
    pub fn repo(&self) -> &NotesRepository<S> {
        &self.repo
    }

    /// The visible view.
    #[must_use]
    pub fn view(&self) -> View {
        self.router.current()
    }

    /// The offline banner.
    #[must_use]
    pub fn banner(&self) -> OfflineBanner {
        self.banner
    }

    /// The creation form.
    #[must_use]
    pub fn form(&self) -> &NoteForm {
        &self.form
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Apply `action`.
    ///
    /// Capture and validation failures are reported as
    /// [`Outcome::Message`] and leave the application running.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store fails.
    pub async fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        debug!("Dispatching {:?}", action);
        match action {
            Action::Navigate(fragment) => {
                self.router.navigate(&fragment);
                Ok(Outcome::Done)
            }
            Action::SetConnectivity(status) => {
                self.banner.update(status);
                Ok(Outcome::Done)
            }
            Action::EditTitle(title) => {
                self.form.title = title;
                Ok(Outcome::Done)
            }
            Action::EditText(text) => {
                self.form.text = text;
                Ok(Outcome::Done)
            }
            Action::RequestLocation => {
                let geo = self.form.geo_mut();
                geo.request(self.locator.as_ref()).await;
                match geo.point() {
                    Some(_) => Ok(Outcome::Done),
                    None => Ok(Outcome::Message(geo.display_text().to_string())),
                }
            }
            Action::StartCamera => {
                let camera = self.form.camera_mut();
                match camera.start(self.camera.as_ref()).await {
                    Ok(()) => Ok(Outcome::Done),
                    Err(err) => Ok(Outcome::Message(
                        camera
                            .error()
                            .map_or_else(|| failure_detail(&err), str::to_string),
                    )),
                }
            }
            Action::TakeSnapshot => match self.form.camera_mut().snapshot() {
                Ok(_) => Ok(Outcome::Done),
                Err(err) => Ok(Outcome::Message(format!(
                    "Could not take photo: {}",
                    failure_detail(&err)
                ))),
            },
            Action::StopCamera => {
                self.form.camera_mut().stop();
                Ok(Outcome::Done)
            }
            Action::SaveNote => {
                let now = Utc::now().timestamp_millis();
                match self.form.save(&self.repo, self.id_source, now) {
                    Ok(outcome) => {
                        self.router.show(outcome.navigate_to);
                        Ok(Outcome::Saved(outcome.note))
                    }
                    Err(err) if err.is_validation() => Ok(Outcome::Message(err.to_string())),
                    Err(err) => Err(err),
                }
            }
            Action::DeleteNote(id) => {
                if !self.confirm.confirm(DELETE_PROMPT) {
                    debug!("Deletion of {} declined", id);
                    return Ok(Outcome::Declined);
                }
                let removed = self.repo.delete(&id)?;
                Ok(Outcome::Deleted(removed))
            }
            Action::ClearAll => {
                self.repo.clear()?;
                info!("Cleared all notes");
                Ok(Outcome::Cleared)
            }
        }
    }

    /// Render the whole page from the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn render_page(&self) -> Result<String> {
        let notes = self.repo.load()?;
        let camera = self.form.camera();
        let page = Page {
            view: self.router.current(),
            notes: &notes,
            banner: self.banner,
            form: FormView {
                title: &self.form.title,
                text: &self.form.text,
                geo_text: self.form.geo().display_text(),
                camera_streaming: camera.is_streaming(),
                preview: camera.photo().map(|photo| photo.data_url.as_str()),
                message: self.form.message(),
            },
        };
        Ok(self.renderer.render_page(&page))
    }

    /// Render the notes list items.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn render_notes(&self) -> Result<String> {
        Ok(self.renderer.render_notes(&self.repo.load()?))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use image::RgbImage;

    use super::*;
    use crate::capture::{FixedLocator, StillImageCamera};
    use crate::note::GeoPoint;
    use crate::render::TimeBasis;
    use crate::storage::MemoryStore;

    fn app() -> App<MemoryStore> {
        App::new(MemoryStore::new(), &Config::default())
            .with_renderer(Renderer::new(TimeBasis::Utc, "%Y-%m-%d %H:%M:%S"))
    }

    fn write_png(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("frame.png");
        RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_navigate_and_fallback() {
        let mut app = app();
        assert_eq!(app.view(), View::Home);

        app.dispatch(Action::Navigate("#/about".to_string()))
            .await
            .unwrap();
        assert_eq!(app.view(), View::About);

        app.dispatch(Action::Navigate("#/settings".to_string()))
            .await
            .unwrap();
        assert_eq!(app.view(), View::Home);
    }

    #[tokio::test]
    async fn test_offline_shows_banner() {
        let mut app = app();
        assert!(app.banner().is_hidden());

        app.dispatch(Action::SetConnectivity(Connectivity::Offline))
            .await
            .unwrap();
        assert!(!app.banner().is_hidden());
        assert!(app
            .render_page()
            .unwrap()
            .contains("<div id=\"offlineBanner\" class=\"banner\">"));
    }

    #[tokio::test]
    async fn test_save_trip_and_render() {
        let mut app = app().with_locator(FixedLocator::new(GeoPoint::new(52.23, 21.01)));
        app.dispatch(Action::Navigate("#/add".to_string()))
            .await
            .unwrap();
        app.dispatch(Action::EditTitle("Trip".to_string()))
            .await
            .unwrap();
        app.dispatch(Action::RequestLocation).await.unwrap();

        let outcome = app.dispatch(Action::SaveNote).await.unwrap();
        assert!(matches!(outcome, Outcome::Saved(ref note) if note.title == "Trip"));
        assert_eq!(app.view(), View::Home);
        assert_eq!(app.form().message(), Some("Saved ✅"));

        let html = app.render_notes().unwrap();
        assert_eq!(html.matches("class=\"noteCard\"").count(), 1);
        assert!(html.contains("52.230000, 21.010000"));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn test_empty_save_reports_message() {
        let mut app = app();
        let outcome = app.dispatch(Action::SaveNote).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Message("Add a title or description.".to_string())
        );
        assert_eq!(app.repo().count().unwrap(), 0);
        assert_eq!(app.view(), View::Home);
    }

    #[tokio::test]
    async fn test_missing_capabilities_report_messages() {
        let mut app = app();

        let outcome = app.dispatch(Action::RequestLocation).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Message("Geolocation unavailable on this device.".to_string())
        );

        let outcome = app.dispatch(Action::StartCamera).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Message("Camera unavailable on this device.".to_string())
        );
    }

    #[tokio::test]
    async fn test_camera_start_failure_message() {
        let mut app = app().with_camera(StillImageCamera::new("/nonexistent/frame.png"));
        let outcome = app.dispatch(Action::StartCamera).await.unwrap();

        match outcome {
            Outcome::Message(message) => {
                assert!(message.starts_with("Could not start camera: "));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!app.form().camera().is_streaming());
    }

    #[tokio::test]
    async fn test_photo_saved_and_stream_released() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app().with_camera(StillImageCamera::new(write_png(dir.path())));

        app.dispatch(Action::EditText("with photo".to_string()))
            .await
            .unwrap();
        app.dispatch(Action::StartCamera).await.unwrap();
        assert!(app.form().camera().is_streaming());
        app.dispatch(Action::TakeSnapshot).await.unwrap();

        let outcome = app.dispatch(Action::SaveNote).await.unwrap();
        let Outcome::Saved(note) = outcome else {
            panic!("note was not saved");
        };
        assert!(note
            .photo_data_url
            .as_deref()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        assert!(!app.form().camera().is_streaming());
        assert!(app.form().camera().photo().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_without_stream_is_noop() {
        let mut app = app();
        let outcome = app.dispatch(Action::TakeSnapshot).await.unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert!(app.form().camera().photo().is_none());
    }

    #[tokio::test]
    async fn test_delete_asks_for_confirmation() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&asked);
        let mut app = app().with_confirm(move |prompt: &str| {
            assert_eq!(prompt, DELETE_PROMPT);
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });
        app.repo().add(Note::new("n1", "keep", "", 1)).unwrap();

        let outcome = app
            .dispatch(Action::DeleteNote("n1".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert_eq!(app.repo().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let mut app = app();
        app.repo().add(Note::new("a", "first", "", 1)).unwrap();
        app.repo().add(Note::new("b", "second", "", 2)).unwrap();

        let outcome = app
            .dispatch(Action::DeleteNote("a".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Deleted(1));
        assert_eq!(app.repo().count().unwrap(), 1);

        let outcome = app.dispatch(Action::ClearAll).await.unwrap();
        assert_eq!(outcome, Outcome::Cleared);
        assert_eq!(app.repo().count().unwrap(), 0);
        assert!(app.render_notes().unwrap().contains("No notes yet."));
    }

    #[tokio::test]
    async fn test_render_page_shows_form_state() {
        let mut app = app();
        app.dispatch(Action::Navigate("add".to_string()))
            .await
            .unwrap();
        app.dispatch(Action::EditTitle("<draft>".to_string()))
            .await
            .unwrap();

        let html = app.render_page().unwrap();
        assert!(html.contains("<section id=\"view-add\" class=\"view\">"));
        assert!(html.contains("value=\"&lt;draft&gt;\""));
    }
}
