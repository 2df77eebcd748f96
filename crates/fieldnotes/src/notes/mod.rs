//! The notes repository.
//!
//! All notes live in one serialized collection under one key of a
//! [`KeyValueStore`]. Every mutation is load, modify, save; there is no
//! locking and the last writer wins.

pub mod record;

use tracing::{debug, info};

use crate::error::Result;
use crate::note::Note;
use crate::storage::KeyValueStore;

pub use record::{
    decode_collection, encode_collection, encode_records, Decoded, Record, IMAGE_FIELD_ALIASES,
};

/// Load/save/delete/clear over the persisted notes collection.
#[derive(Debug)]
pub struct NotesRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> NotesRepository<S> {
    /// Create a repository over `store`, keeping the collection under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The key holding the collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the collection, newest first.
    ///
    /// A missing key or an unreadable value yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    pub fn load(&self) -> Result<Vec<Note>> {
        Ok(self.load_records()?.into_notes())
    }

    /// Every stored element, including those that are not readable notes.
    fn load_records(&self) -> Result<Decoded> {
        let Some(raw) = self.store.get(&self.key)? else {
            debug!("No notes stored under {}", self.key);
            return Ok(Decoded::default());
        };

        let decoded = decode_collection(&raw);
        if decoded.legacy_images > 0 {
            debug!(
                "Normalized {} notes with legacy image fields",
                decoded.legacy_images
            );
        }
        Ok(decoded)
    }

    fn save_records(&self, records: &[Record]) -> Result<()> {
        let raw = encode_records(records)?;
        self.store.set(&self.key, &raw)?;
        debug!("Saved {} records under {}", records.len(), self.key);
        Ok(())
    }

    /// Overwrite the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backing store fails.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let raw = encode_collection(notes)?;
        self.store.set(&self.key, &raw)?;
        debug!("Saved {} notes under {}", notes.len(), self.key);
        Ok(())
    }

    /// Insert a note at the front of the collection and persist it.
    ///
    /// Stored elements that are not readable notes are written back as
    /// they were.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn add(&self, note: Note) -> Result<()> {
        let mut records = self.load_records()?.records;
        info!("Saving note {}", note.id);
        records.insert(0, Record::Note(note));
        self.save_records(&records)
    }

    /// Remove every note whose id equals `id`.
    ///
    /// Returns how many notes were removed. Deleting an unknown id leaves
    /// the collection untouched and returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn delete(&self, id: &str) -> Result<usize> {
        let mut records = self.load_records()?.records;
        let before = records.len();
        records.retain(|record| !record.as_note().is_some_and(|note| note.matches_id(id)));
        let removed = before - records.len();

        if removed > 0 {
            self.save_records(&records)?;
            info!("Deleted note {}", id);
        } else {
            debug!("No note with id {} to delete", id);
        }
        Ok(removed)
    }

    /// Remove the stored collection entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        info!("Cleared all notes");
        Ok(())
    }

    /// Find a note by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn get(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.load()?.into_iter().find(|note| note.matches_id(id)))
    }

    /// Number of stored notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}
