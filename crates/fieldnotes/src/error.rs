//! Error types for fieldnotes.
//!
//! This module defines all error types used throughout the fieldnotes crate,
//! providing detailed context for debugging and user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fieldnotes operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    StoreLock,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Capture Errors ===
    /// The device has no such capability (no geolocation, no camera).
    #[error("{capability} unavailable on this device")]
    CaptureUnavailable {
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// Acquiring a capture failed (permission denied, hardware error).
    #[error("{capability} capture failed: {message}")]
    CaptureFailed {
        /// Name of the capability.
        capability: &'static str,
        /// The underlying error message.
        message: String,
    },

    /// A capture did not complete in time.
    #[error("{capability} capture timed out after {}", describe_millis(.millis))]
    CaptureTimeout {
        /// Name of the capability.
        capability: &'static str,
        /// The configured bound in milliseconds.
        millis: u64,
    },

    /// Encoding a snapshot failed.
    #[error("failed to encode snapshot: {0}")]
    ImageEncode(String),

    /// Loading an image source failed.
    #[error("failed to load image {path}: {message}")]
    ImageLoad {
        /// Path to the image file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Flow Errors ===
    /// A note did not pass validation.
    #[error("{0}")]
    Validation(String),

    /// The user declined a confirmation prompt.
    #[error("operation cancelled: {action}")]
    ConfirmationDeclined {
        /// The action that was not confirmed.
        action: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fieldnotes operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a validation error carrying the message shown to the user.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a capture failure error.
    #[must_use]
    pub fn capture_failed(capability: &'static str, message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            capability,
            message: message.into(),
        }
    }

    /// Create a declined-confirmation error.
    #[must_use]
    pub fn declined(action: impl Into<String>) -> Self {
        Self::ConfirmationDeclined {
            action: action.into(),
        }
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error reports a missing capability.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::CaptureUnavailable { .. })
    }
}

/// Whole seconds when the bound is a multiple of one, otherwise milliseconds.
pub(crate) fn describe_millis(millis: &u64) -> String {
    match *millis {
        0 => "0ms".to_string(),
        ms if ms % 1000 == 0 => format!("{}s", ms / 1000),
        ms => format!("{ms}ms"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");

        let err = Error::validation("Add a title or description.");
        assert_eq!(err.to_string(), "Add a title or description.");
    }

    #[test]
    fn test_error_is_validation() {
        assert!(Error::validation("empty").is_validation());
        assert!(!Error::internal("x").is_validation());
    }

    #[test]
    fn test_error_is_unavailable() {
        let err = Error::CaptureUnavailable { capability: "camera" };
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "camera unavailable on this device");
        assert!(!Error::StoreLock.is_unavailable());
    }

    #[test]
    fn test_capture_failed_display() {
        let err = Error::capture_failed("geolocation", "User denied Geolocation");
        let msg = err.to_string();
        assert!(msg.contains("geolocation"));
        assert!(msg.contains("User denied Geolocation"));
    }

    #[test]
    fn test_capture_timeout_display() {
        let err = Error::CaptureTimeout {
            capability: "geolocation",
            millis: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "geolocation capture timed out after 10s"
        );

        let err = Error::CaptureTimeout {
            capability: "geolocation",
            millis: 1_500,
        };
        assert_eq!(
            err.to_string(),
            "geolocation capture timed out after 1500ms"
        );
    }

    #[test]
    fn test_describe_millis() {
        assert_eq!(describe_millis(&0), "0ms");
        assert_eq!(describe_millis(&500), "500ms");
        assert_eq!(describe_millis(&3_000), "3s");
    }

    #[test]
    fn test_declined_display() {
        let err = Error::declined("delete note abc");
        assert!(err.to_string().contains("delete note abc"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/notes.db",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_image_load_error_display() {
        let err = Error::ImageLoad {
            path: PathBuf::from("/tmp/missing.png"),
            message: "No such file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.png"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
