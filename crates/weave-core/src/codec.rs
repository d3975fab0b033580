//! Markdown file codec
//!
//! A note on disk is a YAML frontmatter block between `---` delimiter lines,
//! followed by a blank line and the body:
//!
//! ```text
//! ---
//! id: my-note-20250122223045
//! title: My Note
//! tags:
//! - idea
//! created: 2025-01-22T22:30:45Z
//! modified: 2025-01-22T22:30:45Z
//! ---
//!
//! Body text
//! ```
//!
//! Metadata values must not contain a line consisting of `---`; the codec
//! does not check for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Note;

const DELIMITER: &str = "---";

/// Errors produced while encoding or decoding a note file
#[derive(Error, Debug)]
pub enum CodecError {
    /// The framing around the metadata block is wrong
    #[error("Malformed note: {reason}")]
    MalformedInput { reason: &'static str },

    /// The metadata block is not valid YAML for the expected fields
    #[error("Malformed frontmatter: {0}")]
    MalformedMetadata(#[source] serde_yaml::Error),

    /// The metadata could not be serialized
    #[error("Failed to serialize frontmatter: {0}")]
    Encode(#[source] serde_yaml::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    links: Vec<String>,
}

/// Serialize a note to its file representation
pub fn encode(note: &Note) -> Result<Vec<u8>, CodecError> {
    let frontmatter = Frontmatter {
        id: note.id.clone(),
        title: note.title.clone(),
        tags: note.tags.clone(),
        created: note.created,
        modified: note.modified,
        links: note.links.clone(),
    };
    let yaml = serde_yaml::to_string(&frontmatter).map_err(CodecError::Encode)?;

    let mut out = String::with_capacity(yaml.len() + note.body.len() + 16);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');

    if !note.body.is_empty() {
        out.push('\n');
        out.push_str(&note.body);
        if !note.body.ends_with('\n') {
            out.push('\n');
        }
    }

    Ok(out.into_bytes())
}

/// Parse a note from its file representation
///
/// CRLF line endings are accepted. Timestamps come back in UTC whatever
/// offset they were written with.
pub fn decode(data: &[u8]) -> Result<Note, CodecError> {
    let text = std::str::from_utf8(data).map_err(|_| CodecError::MalformedInput {
        reason: "file is not valid UTF-8",
    })?;
    let content = text.replace("\r\n", "\n");

    let rest = content
        .strip_prefix("---\n")
        .ok_or(CodecError::MalformedInput {
            reason: "missing opening frontmatter delimiter",
        })?;

    let (meta, body) = split_frontmatter(rest).ok_or(CodecError::MalformedInput {
        reason: "closing frontmatter delimiter not found",
    })?;

    let body = body.strip_prefix('\n').unwrap_or(body);
    let body = body.strip_suffix('\n').unwrap_or(body);

    let frontmatter: Frontmatter = if meta.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(meta).map_err(CodecError::MalformedMetadata)?
    };

    Ok(Note {
        id: frontmatter.id,
        title: frontmatter.title,
        body: body.to_string(),
        tags: frontmatter.tags,
        created: frontmatter.created,
        modified: frontmatter.modified,
        links: frontmatter.links,
    })
}

/// Split the text after the opening delimiter into (metadata, body)
///
/// The closing delimiter must sit on its own line, so the metadata block
/// always keeps its final newline.
fn split_frontmatter(rest: &str) -> Option<(&str, &str)> {
    if let Some(idx) = rest.find("\n---\n") {
        return Some((&rest[..=idx], &rest[idx + 5..]));
    }
    if rest.ends_with("\n---") {
        return Some((&rest[..rest.len() - DELIMITER.len()], ""));
    }
    None
}
