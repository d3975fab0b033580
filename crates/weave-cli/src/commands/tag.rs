//! Tag command handlers

use std::collections::BTreeMap;

use anyhow::Result;

use weave_core::{Note, NoteStore};

use crate::output::Output;

/// List all tags with usage counts
pub fn list(store: &NoteStore, output: &Output) -> Result<()> {
    let listing = store.list();
    output.warn_failures(&listing.errors);

    output.print_tags(&count_tags(&listing.notes));
    Ok(())
}

/// Count tag usage, sorted by tag name
fn count_tags(notes: &[Note]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in notes.iter().flat_map(|n| n.tags.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}
