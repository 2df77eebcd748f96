//! Reading and writing the persisted notes collection.
//!
//! The collection is a JSON array of note objects. Writers always emit the
//! canonical layout of [`Note`]. Readers accept everything older clients
//! have written: numeric ids, missing fields, and a handful of alternative
//! names for the image field. Records are normalized once here, on load, so
//! nothing downstream has to know about the old spellings.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::note::{GeoPoint, Note, NO_LOCATION_TEXT};

/// Image field names in lookup order. The first one is canonical.
pub const IMAGE_FIELD_ALIASES: [&str; 5] = [
    "photoDataUrl",
    "photoDataURL",
    "photo",
    "imageDataUrl",
    "image",
];

/// One element of the stored array.
///
/// Elements that cannot be read as a note are kept verbatim so that
/// rewriting the collection never loses them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// A readable note.
    Note(Note),
    /// An element with no usable id, or not an object at all.
    Opaque(Value),
}

impl Record {
    /// The note, if this element is one.
    #[must_use]
    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Self::Note(note) => Some(note),
            Self::Opaque(_) => None,
        }
    }
}

/// Result of decoding a stored collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// Every element in stored order.
    pub records: Vec<Record>,
    /// Elements kept as [`Record::Opaque`].
    pub skipped: usize,
    /// Notes whose image came from a non-canonical field name.
    pub legacy_images: usize,
}

impl Decoded {
    /// The readable notes in stored order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.records.iter().filter_map(Record::as_note)
    }

    /// Consume into the readable notes in stored order.
    #[must_use]
    pub fn into_notes(self) -> Vec<Note> {
        self.records
            .into_iter()
            .filter_map(|record| match record {
                Record::Note(note) => Some(note),
                Record::Opaque(_) => None,
            })
            .collect()
    }
}

/// Decode a stored collection.
///
/// Never fails: a value that is not JSON, or JSON that is not an array,
/// decodes as an empty collection. Elements without a usable id are kept
/// as [`Record::Opaque`] and left out of [`Decoded::notes`].
#[must_use]
pub fn decode_collection(raw: &str) -> Decoded {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored notes are not valid JSON, treating as empty: {}", e);
            return Decoded::default();
        }
    };

    let Value::Array(items) = value else {
        warn!("Stored notes are not a JSON array, treating as empty");
        return Decoded::default();
    };

    let mut decoded = Decoded::default();
    for item in items {
        let normalized = item.as_object().and_then(normalize_record);
        match normalized {
            Some((note, legacy)) => {
                if legacy {
                    decoded.legacy_images += 1;
                }
                decoded.records.push(Record::Note(note));
            }
            None => {
                decoded.skipped += 1;
                decoded.records.push(Record::Opaque(item));
            }
        }
    }

    if decoded.skipped > 0 {
        warn!("Keeping {} unreadable note records as stored", decoded.skipped);
    }
    decoded
}

/// Serialize a collection of notes in the canonical layout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_collection(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string(notes)?)
}

/// Serialize decoded records: notes in the canonical layout, opaque
/// elements unchanged.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_records(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Turn one stored object into a [`Note`].
///
/// Returns the note and whether its image was found under a legacy name,
/// or `None` if the record has no usable id.
fn normalize_record(fields: &Map<String, Value>) -> Option<(Note, bool)> {
    let id = read_id(fields.get("id")?)?;

    let geo = fields.get("geo").and_then(read_geo);
    let geo_text = match fields.get("geoText").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => geo.map_or_else(|| NO_LOCATION_TEXT.to_string(), |p| p.display_text()),
    };

    let (photo_data_url, legacy) = match read_image(fields) {
        Some((index, url)) => (Some(url), index > 0),
        None => (None, false),
    };

    let note = Note {
        id,
        title: read_string(fields, "title"),
        text: read_string(fields, "text"),
        created_at: fields.get("createdAt").and_then(read_millis).unwrap_or(0),
        geo,
        geo_text,
        photo_data_url,
    };
    Some((note, legacy))
}

fn read_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_string(fields: &Map<String, Value>, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[allow(clippy::cast_possible_truncation)]
fn read_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn read_geo(value: &Value) -> Option<GeoPoint> {
    let lat = value.get("lat")?.as_f64()?;
    let lon = value.get("lon")?.as_f64()?;
    Some(GeoPoint::new(lat, lon))
}

fn read_image(fields: &Map<String, Value>) -> Option<(usize, String)> {
    IMAGE_FIELD_ALIASES
        .iter()
        .enumerate()
        .find_map(|(index, name)| match fields.get(*name) {
            Some(Value::String(url)) if !url.is_empty() => Some((index, url.clone())),
            _ => None,
        })
}
