//! Wiki-style link annotations in note bodies
//!
//! Supported forms:
//!
//! - `[[target]]`
//! - `[[type::target]]`
//! - `[[target|label]]`
//! - `[[type::target|label]]`
//!
//! Matching is deliberately simple and does not nest: an empty `[[]]`, or a
//! pair whose content contains another `[[`, is skipped and scanning resumes
//! after its `]]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation used when a link does not name one
pub const DEFAULT_LINK_TYPE: &str = "linksTo";

/// A typed reference found in body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Identifier of the referenced note
    pub target: String,
    /// Relation name
    pub link_type: String,
    /// Display text, if any
    pub label: Option<String>,
}

impl Link {
    /// Create a link of the default type
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            link_type: DEFAULT_LINK_TYPE.to_string(),
            label: None,
        }
    }

    /// Check whether the link uses the default relation
    pub fn is_default_type(&self) -> bool {
        self.link_type == DEFAULT_LINK_TYPE
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.as_deref().unwrap_or("");
        f.write_str(&format_link(&self.target, &self.link_type, label))
    }
}

/// Render a link annotation
///
/// An empty `link_type` means the default. The `type::` prefix is left out
/// for the default type and `|label` is left out for an empty label.
pub fn format_link(target: &str, link_type: &str, label: &str) -> String {
    let link_type = if link_type.is_empty() {
        DEFAULT_LINK_TYPE
    } else {
        link_type
    };

    let mut out = String::from("[[");
    if link_type != DEFAULT_LINK_TYPE {
        out.push_str(link_type);
        out.push_str("::");
    }
    out.push_str(target);
    if !label.is_empty() {
        out.push('|');
        out.push_str(label);
    }
    out.push_str("]]");
    out
}

/// Extract every well-formed link from `body`, in order of appearance
pub fn parse_links(body: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut start = 0;

    while let Some(open) = body[start..].find("[[").map(|i| i + start) {
        let Some(close) = body[open + 2..].find("]]").map(|i| i + open + 2) else {
            break;
        };

        let content = &body[open + 2..close];
        start = close + 2;

        if content.is_empty() || content.contains("[[") {
            continue;
        }

        if let Some(link) = parse_link_content(content) {
            links.push(link);
        }
    }

    links
}

fn parse_link_content(content: &str) -> Option<Link> {
    let (left, label) = match content.split_once('|') {
        Some((left, label)) => (left, label),
        None => (content, ""),
    };

    let (link_type, target) = match left.split_once("::") {
        Some((link_type, target)) => {
            if link_type.is_empty() || target.is_empty() {
                return None;
            }
            (link_type, target)
        }
        None => (DEFAULT_LINK_TYPE, left),
    };

    if target.is_empty() {
        return None;
    }

    Some(Link {
        target: target.to_string(),
        link_type: link_type.to_string(),
        label: (!label.is_empty()).then(|| label.to_string()),
    })
}
