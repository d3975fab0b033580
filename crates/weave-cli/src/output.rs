//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::path::Path;

use weave_core::{Link, Note, StoreError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single note with its body
    pub fn print_note(&self, note: &Note) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", note.id);
                println!("Title:    {}", note.title);
                if !note.tags.is_empty() {
                    println!("Tags:     {}", note.tags.join(", "));
                }
                if let Some(created) = note.created {
                    println!("Created:  {}", created.format("%Y-%m-%d %H:%M"));
                }
                if let Some(modified) = note.modified {
                    println!("Modified: {}", modified.format("%Y-%m-%d %H:%M"));
                }
                if !note.links.is_empty() {
                    println!("Links:    {}", note.links.join(", "));
                }
                if !note.body.is_empty() {
                    println!();
                    println!("{}", note.body);
                }
            }
            OutputFormat::Json => print_json(note),
            OutputFormat::Quiet => println!("{}", note.id),
        }
    }

    /// Print a list of notes
    pub fn print_notes(&self, notes: &[&Note]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for note in notes {
                    let tags = if note.tags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", note.tags.join(", "))
                    };
                    println!("{} | {}{}", note.id, truncate(&note.title, 40), tags);
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => print_json(&notes),
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Print the body annotations of a note
    pub fn print_links(&self, note: &Note, links: &[Link]) {
        match self.format {
            OutputFormat::Human => {
                println!("Links in: {} - {}", note.id, note.title);
                println!();
                if links.is_empty() {
                    println!("No links in this note.");
                    return;
                }
                for link in links {
                    println!("  {}", link);
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => print_json(&links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_tags);
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a file path
    pub fn print_path(&self, path: &Path) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", path.display()),
        }
    }

    /// Report files that could not be loaded during a listing
    ///
    /// Always goes to stderr so listings stay pipeable.
    pub fn warn_failures(&self, errors: &[StoreError]) {
        if errors.is_empty() || self.is_quiet() {
            return;
        }
        for err in errors {
            eprintln!("⚠ {}", err);
        }
        eprintln!("⚠ {} file(s) could not be loaded", errors.len());
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
