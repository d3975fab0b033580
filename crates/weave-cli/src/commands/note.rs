//! Note command handlers

use anyhow::{Context, Result};
use chrono::Utc;

use weave_core::{Config, Note, NoteStore};

use crate::editor::{confirm, edit_text, read_body};
use crate::output::Output;

/// Create a new note
pub fn create(
    store: &NoteStore,
    config: &Config,
    title: String,
    body: Option<String>,
    tags: Vec<String>,
    links: Vec<String>,
    output: &Output,
) -> Result<()> {
    let body = match body {
        Some(b) => b,
        None => read_body(config.editor.as_deref(), "")
            .context("Failed to read note body")?
            .trim_end()
            .to_string(),
    };

    let mut note = Note::new(title).with_body(body);
    for tag in tags {
        note.add_tag(tag);
    }
    for link in links {
        note.add_link(link);
    }

    let id = store
        .create(note, Utc::now())
        .context("Failed to create note")?;

    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Created note {}", id));
    }
    Ok(())
}

/// Show a single note
pub fn show(store: &NoteStore, id: String, output: &Output) -> Result<()> {
    let note = store
        .read(&id)
        .with_context(|| format!("Failed to read note {}", id))?;
    output.print_note(&note);
    Ok(())
}

/// Edit an existing note
///
/// Field flags replace the matching fields. Without any, the body is opened
/// in the editor.
pub fn edit(
    store: &NoteStore,
    config: &Config,
    id: String,
    title: Option<String>,
    body: Option<String>,
    tags: Vec<String>,
    output: &Output,
) -> Result<()> {
    let mut note = store
        .read(&id)
        .with_context(|| format!("Failed to read note {}", id))?;

    let interactive = title.is_none() && body.is_none() && tags.is_empty();

    if let Some(title) = title {
        note.set_title(title);
    }
    if let Some(body) = body {
        note.set_body(body);
    }
    if !tags.is_empty() {
        note.set_tags(tags);
    }

    if interactive {
        let edited =
            edit_text(config.editor.as_deref(), &note.body).context("Failed to edit note")?;
        let edited = edited.trim_end();
        if edited == note.body {
            output.message("No changes.");
            return Ok(());
        }
        note.set_body(edited);
    }

    store
        .update(&id, note, Utc::now())
        .with_context(|| format!("Failed to update note {}", id))?;

    output.success(&format!("Updated note {}", id));
    Ok(())
}

/// Delete a note
pub fn delete(store: &NoteStore, id: String, force: bool, output: &Output) -> Result<()> {
    let note = store
        .read(&id)
        .with_context(|| format!("Failed to read note {}", id))?;

    if !force && output.should_prompt() {
        println!("Delete note: {} - {}", note.id, note.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete(&id)
        .with_context(|| format!("Failed to delete note {}", id))?;

    output.success(&format!("Deleted note: {}", id));
    Ok(())
}

/// List notes, optionally filtered by tag
///
/// Files that fail to load are reported on stderr; the rest are still listed.
pub fn list(store: &NoteStore, tag: Option<String>, output: &Output) -> Result<()> {
    let listing = store.list();

    let notes: Vec<&Note> = listing
        .notes
        .iter()
        .filter(|n| tag.as_deref().map_or(true, |t| n.has_tag(t)))
        .collect();

    output.print_notes(&notes);
    output.warn_failures(&listing.errors);
    Ok(())
}

/// Print the storage path of a note
pub fn path(store: &NoteStore, id: String, output: &Output) -> Result<()> {
    let path = store.path_for(&id)?;
    output.print_path(&path);
    Ok(())
}
