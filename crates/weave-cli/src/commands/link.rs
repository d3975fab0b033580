//! Link command handlers
//!
//! Shows the `[[...]]` annotations written in a note's body. Declared links
//! from the frontmatter are shown by `weave show`.

use anyhow::{Context, Result};

use weave_core::{parse_links, NoteStore};

use crate::output::Output;

/// Print the links annotated in a note body
pub fn show(store: &NoteStore, id: String, output: &Output) -> Result<()> {
    let note = store
        .read(&id)
        .with_context(|| format!("Failed to read note {}", id))?;

    let links = parse_links(&note.body);
    output.print_links(&note, &links);
    Ok(())
}
