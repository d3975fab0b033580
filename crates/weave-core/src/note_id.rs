//! Note identifiers and storage paths
//!
//! An identifier is a slug of the note's title followed by the creation
//! time as a 14-digit UTC timestamp:
//!
//! ```text
//! my-note-title-20250122223045
//! ```
//!
//! The timestamp suffix also decides where the file lives, sharded by year
//! and month: `{vault}/2025/01/my-note-title-20250122223045.md`.
//!
//! A slug that itself ends in 14 digits makes the suffix ambiguous. This is
//! not guarded against.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Length of the `YYYYMMDDhhmmss` suffix
pub const TIMESTAMP_LEN: usize = 14;

/// File extension of note files
pub const NOTE_EXTENSION: &str = "md";

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Errors that can occur when mapping an identifier to a path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteIdError {
    #[error("Invalid note identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },
}

/// Build the identifier for a note titled `title` created at `timestamp`
///
/// The timestamp is converted to UTC first, so the same instant gives the
/// same identifier in every time zone.
pub fn generate_id<Tz: TimeZone>(title: &str, timestamp: &DateTime<Tz>) -> String {
    let slug = slugify(title);
    let ts = format_timestamp(timestamp);

    if slug.is_empty() {
        ts
    } else {
        format!("{}-{}", slug, ts)
    }
}

/// Normalize a title into the `[a-z0-9-]` alphabet
///
/// Spaces become hyphens, other characters outside the alphabet are
/// dropped, hyphen runs collapse and edge hyphens are trimmed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for c in title.to_lowercase().chars() {
        let c = if c == ' ' { '-' } else { c };
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            '-' if !slug.is_empty() && !slug.ends_with('-') => slug.push('-'),
            _ => {}
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Format a timestamp as `YYYYMMDDhhmmss` in UTC
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    timestamp
        .with_timezone(&Utc)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Map an identifier to its file under `vault_root`
///
/// The year and month directories come from the identifier's timestamp
/// suffix, not from the note's `created` field.
pub fn resolve_path(vault_root: &Path, id: &str) -> Result<PathBuf, NoteIdError> {
    let timestamp = timestamp_suffix(id)?;

    let year = &timestamp[0..4];
    let month = &timestamp[4..6];

    Ok(vault_root
        .join(year)
        .join(month)
        .join(format!("{}.{}", id, NOTE_EXTENSION)))
}

/// Return the trailing 14-digit timestamp of an identifier
pub fn timestamp_suffix(id: &str) -> Result<&str, NoteIdError> {
    let invalid = |reason| NoteIdError::InvalidIdentifier {
        id: id.to_string(),
        reason,
    };

    if id.len() < TIMESTAMP_LEN {
        return Err(invalid("shorter than the 14-digit timestamp suffix"));
    }
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(invalid("contains path characters"));
    }

    let split = id.len() - TIMESTAMP_LEN;
    if !id.is_char_boundary(split) {
        return Err(invalid("timestamp suffix is not numeric"));
    }
    let timestamp = &id[split..];
    if !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("timestamp suffix is not numeric"));
    }

    Ok(timestamp)
}
