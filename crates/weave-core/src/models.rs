//! Data models for Weave
//!
//! A `Note` is the only record the store persists. Identity and timestamps
//! are assigned by the store; everything else is owned by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plain-text note with structured metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    /// Stable identifier, derived from title and creation time
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Free-form body text
    pub body: String,
    /// Tags for organization (order preserved)
    pub tags: Vec<String>,
    /// When this note was created; `None` until the store creates it
    pub created: Option<DateTime<Utc>>,
    /// When this note was last written
    pub modified: Option<DateTime<Utc>>,
    /// Declared references to other notes
    pub links: Vec<String>,
}

impl Note {
    /// Create a draft note with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder-style body setter
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Builder-style tags setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Update the body
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Add a tag
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Remove a tag
    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        }
    }

    /// Set all tags (replacing existing)
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Declare a reference to another note
    pub fn add_link(&mut self, target: impl Into<String>) {
        let target = target.into();
        if !self.links.contains(&target) {
            self.links.push(target);
        }
    }

    /// Check whether the note carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
