//! Storage error handling
//!
//! Provides typed errors for store operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::codec::CodecError;
use crate::note_id::NoteIdError;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No note file exists for the identifier
    #[error("Note not found: '{id}' (expected at '{path}')")]
    NotFound { id: String, path: PathBuf },

    /// Creating would overwrite a note with the same identifier
    #[error("Note '{id}' already exists at '{path}'")]
    AlreadyExists { id: String, path: PathBuf },

    /// The identifier cannot be mapped to a path
    #[error(transparent)]
    InvalidIdentifier(#[from] NoteIdError),

    /// The file exists but is not a valid note
    #[error("Failed to decode note '{path}' during {op}: {source}")]
    Decode {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// An update would leave `modified` earlier than `created`
    #[error("Cannot update note '{id}': modified time {modified} is before created time {created}")]
    TimestampBeforeCreated {
        id: String,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    },

    /// The note could not be serialized
    #[error("Failed to encode note '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: CodecError,
    },

    /// Failed to create a shard directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied while trying to {op} '{path}'. Check file permissions.")]
    PermissionDenied {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while trying to {op} '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure, with the operation that hit it
    #[error("Failed to {op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking the vault tree failed
    #[error("Failed to walk vault at '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl StoreError {
    /// Create an error from an I/O error with operation and path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(op: &'static str, path: PathBuf, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                op,
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StoreError::DiskFull {
                op,
                path,
                source: error,
            },
            _ => StoreError::Io {
                op,
                path,
                source: error,
            },
        }
    }

    /// Check if this is a missing-note error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// The file this error is about, when there is one
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            StoreError::NotFound { path, .. }
            | StoreError::AlreadyExists { path, .. }
            | StoreError::Decode { path, .. }
            | StoreError::CreateDirectory { path, .. }
            | StoreError::PermissionDenied { path, .. }
            | StoreError::DiskFull { path, .. }
            | StoreError::Io { path, .. }
            | StoreError::Walk { path, .. } => Some(path),
            StoreError::AtomicWriteFailed { to, .. } => Some(to),
            StoreError::InvalidIdentifier(_)
            | StoreError::Encode { .. }
            | StoreError::TimestampBeforeCreated { .. } => None,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the vault.")
            }
            StoreError::CreateDirectory { .. } => {
                Some("Check that the vault directory exists and you have write permissions.")
            }
            StoreError::Decode { .. } => {
                Some("Open the file in an editor and fix its frontmatter block.")
            }
            StoreError::AlreadyExists { .. } => {
                Some("Wait a second or choose a different title; identifiers have one-second resolution.")
            }
            StoreError::TimestampBeforeCreated { .. } => {
                Some("Check the system clock; a note cannot be modified before it was created.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
