//! `fieldnotes` - Offline-first field notes with location and camera capture
//!
//! This library provides the notes store, the capture state machines for
//! geolocation and camera snapshots, the note creation flow and the HTML
//! rendering of the application page.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod capture;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod note;
pub mod notes;
pub mod render;
pub mod router;
pub mod storage;

pub use app::{Action, App, Confirm, Outcome};
pub use compose::{IdSource, NoteForm};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use network::Connectivity;
pub use note::{GeoPoint, Note};
pub use notes::NotesRepository;
pub use render::Renderer;
pub use router::View;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
