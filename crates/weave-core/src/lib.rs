//! Weave Core Library
//!
//! This crate provides the core of Weave, a personal note store that keeps
//! every note as a Markdown file with YAML frontmatter inside a vault
//! directory.
//!
//! # Architecture
//!
//! - **Files are the source of truth**: there is no index or cache, every
//!   operation reads or writes the vault directly
//! - **Atomic writes**: notes are written to a temp file and renamed into place
//!
//! # Quick Start
//!
//! ```text
//! let store = NoteStore::new("/home/me/notes");
//!
//! let id = store.create(Note::new("Groceries").with_body("milk"), Utc::now())?;
//! let note = store.read(&id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: CRUD and listing (main entry point)
//! - `models`: The `Note` record
//! - `codec`: Markdown file encoding
//! - `note_id`: Identifier and storage path derivation
//! - `links`: `[[wiki-style]]` link annotations in note bodies
//! - `storage`: Store errors and atomic writes
//! - `config`: Application configuration

pub mod codec;
pub mod config;
pub mod links;
pub mod models;
pub mod note_id;
pub mod storage;
pub mod store;

pub use codec::CodecError;
pub use config::Config;
pub use links::{format_link, parse_links, Link, DEFAULT_LINK_TYPE};
pub use models::Note;
pub use note_id::{generate_id, resolve_path, NoteIdError};
pub use storage::{StoreError, StoreResult};
pub use store::{Listing, NoteStore};
