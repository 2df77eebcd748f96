//! Schema setup for the notes database.
//!
//! There is a single schema version. Opening a store creates the tables,
//! stamps the version on a fresh file, and refuses files written by a newer
//! `fnote`.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Schema version written by this build.
pub const CURRENT_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

/// Create the tables and check the stored schema version.
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the file carries an unreadable
/// version or one newer than [`CURRENT_VERSION`].
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(stored) = stored else {
        debug!("Stamping new notes database with schema v{}", CURRENT_VERSION);
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?1, ?2)",
            (VERSION_KEY, CURRENT_VERSION.to_string()),
        )?;
        return Ok(());
    };

    let version: i32 = stored.parse().map_err(|_| Error::DatabaseMigration {
        message: format!("invalid schema version: {stored}"),
    })?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "notes database uses schema v{version}; this fnote supports up to \
                 v{CURRENT_VERSION}"
            ),
        });
    }
    Ok(())
}
