//! Interactive editing support
//!
//! Opens the configured editor (or $EDITOR) for editing note bodies.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::Command;

/// Open content in the user's preferred editor
///
/// `configured` comes from `--editor`, WEAVE_EDITOR or the config file and
/// wins over $EDITOR and $VISUAL. It may carry arguments (`code --wait`).
pub fn edit_text(configured: Option<&str>, initial_content: &str) -> Result<String> {
    let editor = find_editor(configured)?;
    let mut parts = editor.split_whitespace();
    let program = parts.next().context("Editor command is empty")?;

    let temp_path = env::temp_dir().join(format!("weave_edit_{}.md", std::process::id()));

    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(program)
        .args(parts)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(&temp_path)
        .with_context(|| format!("Failed to read edited file: {:?}", temp_path))?;

    let _ = fs::remove_file(&temp_path);

    Ok(content)
}

/// Read a note body: from the editor on a TTY, from piped stdin otherwise
pub fn read_body(configured: Option<&str>, initial_content: &str) -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        return edit_text(configured, initial_content);
    }

    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read note body from stdin")?;
    Ok(body)
}

/// Find the user's preferred editor
fn find_editor(configured: Option<&str>) -> Result<String> {
    if let Some(editor) = configured.filter(|e| !e.trim().is_empty()) {
        return Ok(editor.to_string());
    }

    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];

    for editor in common_editors {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Pass --editor, set WEAVE_EDITOR or set $EDITOR.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
