//! Note store
//!
//! `NoteStore` performs create/read/update/delete/list against a vault
//! directory. It keeps no in-memory state besides the vault root: every
//! call goes to disk, so results always reflect what is on the filesystem.
//!
//! ## Usage
//!
//! ```ignore
//! let store = NoteStore::new("/home/me/notes");
//!
//! let id = store.create(Note::new("Groceries").with_body("milk"), Utc::now())?;
//! let note = store.read(&id)?;
//!
//! let listing = store.list();
//! for (path, err) in listing.failures() { ... }
//! ```
//!
//! The store does not lock. Two writers updating the same note race and the
//! last rename wins; callers needing multi-writer safety serialize access
//! themselves.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::codec;
use crate::config::Config;
use crate::models::Note;
use crate::note_id::{self, NOTE_EXTENSION};
use crate::storage::{atomic_write, StoreError, StoreResult};

/// File-backed note store rooted at a vault directory
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

/// Result of a best-effort listing
///
/// Holds every note that could be decoded plus one error per file that
/// could not, so a single corrupt note never hides the rest of the vault.
#[derive(Debug, Default)]
pub struct Listing {
    /// Notes decoded successfully, in path order
    pub notes: Vec<Note>,
    /// Per-file failures, and at most one terminal walk failure
    pub errors: Vec<StoreError>,
}

impl Listing {
    /// Check whether any file failed
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate failures together with the path they refer to
    pub fn failures(&self) -> impl Iterator<Item = (Option<&PathBuf>, &StoreError)> {
        self.errors.iter().map(|e| (e.path(), e))
    }
}

impl NoteStore {
    /// Create a store over an already validated vault directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store over the vault named by a configuration
    pub fn open_with_config(config: &Config) -> Self {
        Self::new(config.vault_dir.clone())
    }

    /// The vault root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage path of a note identifier
    pub fn path_for(&self, id: &str) -> StoreResult<PathBuf> {
        Ok(note_id::resolve_path(&self.root, id)?)
    }

    /// Check whether a note file exists for the identifier
    pub fn exists(&self, id: &str) -> StoreResult<bool> {
        let path = self.path_for(id)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::from_io("stat", path, e)),
        }
    }

    // ==================== CRUD ====================

    /// Persist a new note and return its identifier
    ///
    /// The identifier is derived from the title and `timestamp`; `id`,
    /// `created` and `modified` on the passed note are overwritten. Creating
    /// a note whose identifier is already taken fails with `AlreadyExists`.
    pub fn create<Tz: TimeZone>(
        &self,
        mut note: Note,
        timestamp: DateTime<Tz>,
    ) -> StoreResult<String> {
        let timestamp = timestamp.with_timezone(&Utc);
        let id = note_id::generate_id(&note.title, &timestamp);

        note.id = id.clone();
        note.created = Some(timestamp);
        note.modified = Some(timestamp);

        let path = self.path_for(&id)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| StoreError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        // Not atomic with the rename below; see the module docs on locking
        if path.exists() {
            return Err(StoreError::AlreadyExists { id, path });
        }

        self.write_note(&path, &note)?;
        debug!("Created note {} at {:?}", id, path);
        Ok(id)
    }

    /// Load a note by identifier
    pub fn read(&self, id: &str) -> StoreResult<Note> {
        self.read_for("read", id)
    }

    fn read_for(&self, op: &'static str, id: &str) -> StoreResult<Note> {
        let path = self.path_for(id)?;
        read_note_file(op, &path).map_err(|e| match e {
            ReadFailure::Missing => StoreError::NotFound {
                id: id.to_string(),
                path: path.clone(),
            },
            ReadFailure::Failed(e) => e,
        })
    }

    /// Replace the content of an existing note
    ///
    /// The stored `created` timestamp is kept whatever the caller passed;
    /// `modified` becomes `timestamp`, which must not be earlier than
    /// `created`. Returns the note as written.
    pub fn update<Tz: TimeZone>(
        &self,
        id: &str,
        mut note: Note,
        timestamp: DateTime<Tz>,
    ) -> StoreResult<Note> {
        let existing = self.read_for("read existing note", id)?;
        let path = self.path_for(id)?;
        let modified = timestamp.with_timezone(&Utc);

        if let Some(created) = existing.created {
            if modified < created {
                return Err(StoreError::TimestampBeforeCreated {
                    id: id.to_string(),
                    created,
                    modified,
                });
            }
        }

        note.id = id.to_string();
        note.created = existing.created;
        note.modified = Some(modified);

        self.write_note(&path, &note)?;
        debug!("Updated note {} at {:?}", id, path);
        Ok(note)
    }

    /// Remove a note
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let path = self.path_for(id)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted note {} at {:?}", id, path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                id: id.to_string(),
                path,
            }),
            Err(e) => Err(StoreError::from_io("remove", path, e)),
        }
    }

    /// Load every note in the vault, best effort
    ///
    /// Files that fail to read or decode are reported in `Listing::errors`
    /// and the walk continues. If the vault root itself cannot be read, that
    /// is the only error and no notes are returned.
    pub fn list(&self) -> Listing {
        let mut listing = Listing::default();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let at_root = source.depth() == 0;
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    warn!("Failed to walk {:?}: {}", path, source);
                    listing.errors.push(StoreError::Walk { path, source });
                    if at_root {
                        break;
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_note_file(entry.path()) {
                continue;
            }

            match read_note_file("list", entry.path()) {
                Ok(note) => listing.notes.push(note),
                // Deleted between the directory read and the file read
                Err(ReadFailure::Missing) => {}
                Err(ReadFailure::Failed(e)) => {
                    warn!("Skipping {:?}: {}", entry.path(), e);
                    listing.errors.push(e);
                }
            }
        }

        debug!(
            "Listed {} notes ({} errors) under {:?}",
            listing.notes.len(),
            listing.errors.len(),
            self.root
        );
        listing
    }

    // ==================== Internals ====================

    fn write_note(&self, path: &Path, note: &Note) -> StoreResult<()> {
        let data = codec::encode(note).map_err(|source| StoreError::Encode {
            id: note.id.clone(),
            source,
        })?;
        atomic_write(path, &data)
    }
}

enum ReadFailure {
    Missing,
    Failed(StoreError),
}

fn read_note_file(op: &'static str, path: &Path) -> Result<Note, ReadFailure> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ReadFailure::Missing
        } else {
            ReadFailure::Failed(StoreError::from_io("read", path.to_path_buf(), e))
        }
    })?;

    codec::decode(&data).map_err(|source| {
        ReadFailure::Failed(StoreError::Decode {
            op,
            path: path.to_path_buf(),
            source,
        })
    })
}

fn is_note_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == NOTE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::storage::temp_path_for;
    use chrono::{Duration, FixedOffset};
    use tempfile::TempDir;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 22, 22, 30, 45).unwrap()
    }

    fn test_store(temp_dir: &TempDir) -> NoteStore {
        NoteStore::new(temp_dir.path())
    }

    #[test]
    fn test_create_writes_sharded_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let note = Note::new("My Note Title").with_body("Hello");
        let id = store.create(note, sample_time()).unwrap();

        assert_eq!(id, "my-note-title-20250122223045");
        let path = temp_dir
            .path()
            .join("2025")
            .join("01")
            .join("my-note-title-20250122223045.md");
        assert!(path.is_file());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_create_assigns_identity_and_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut note = Note::new("Test").with_body("Body").with_tags(["idea"]);
        note.id = "ignored".to_string();
        note.created = Some(sample_time() - Duration::days(30));

        let id = store.create(note, sample_time()).unwrap();
        let stored = store.read(&id).unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "Test");
        assert_eq!(stored.body, "Body");
        assert_eq!(stored.tags, vec!["idea"]);
        assert_eq!(stored.created, Some(sample_time()));
        assert_eq!(stored.modified, Some(sample_time()));
    }

    #[test]
    fn test_create_normalizes_timestamp_to_utc() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = est.with_ymd_and_hms(2025, 1, 22, 17, 30, 45).unwrap();

        let id = store.create(Note::new("Zoned"), local).unwrap();
        assert_eq!(id, "zoned-20250122223045");
        assert_eq!(store.read(&id).unwrap().created, Some(sample_time()));
    }

    #[test]
    fn test_create_empty_title_uses_bare_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new(""), sample_time()).unwrap();
        assert_eq!(id, "20250122223045");
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn test_create_rejects_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store
            .create(Note::new("Same").with_body("first"), sample_time())
            .unwrap();
        let err = store
            .create(Note::new("Same").with_body("second"), sample_time())
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(store.read(&id).unwrap().body, "first");
    }

    #[test]
    fn test_empty_body_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Empty"), sample_time()).unwrap();
        let content = fs::read_to_string(store.path_for(&id).unwrap()).unwrap();

        assert!(content.ends_with("\n---\n"));
        assert_eq!(store.read(&id).unwrap().body, "");
    }

    #[test]
    fn test_read_missing_note() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let err = store.read("missing-20250122223045").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_invalid_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let err = store.read("short").unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_read_corrupt_note() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = "broken-20250122223045";
        let path = store.path_for(id).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "no frontmatter here").unwrap();

        let err = store.read(id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Decode {
                source: CodecError::MalformedInput { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_update_preserves_created() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Draft"), sample_time()).unwrap();

        let later = sample_time() + Duration::hours(2);
        let mut changed = Note::new("Renamed").with_body("Updated body");
        changed.created = Some(later + Duration::days(1));

        let written = store.update(&id, changed, later).unwrap();
        assert_eq!(written.id, id);

        let stored = store.read(&id).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.body, "Updated body");
        assert_eq!(stored.created, Some(sample_time()));
        assert_eq!(stored.modified, Some(later));
        assert!(stored.modified >= stored.created);
    }

    #[test]
    fn test_update_keeps_path_when_title_changes() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Old Title"), sample_time()).unwrap();
        let path = store.path_for(&id).unwrap();

        store
            .update(&id, Note::new("New Title"), sample_time() + Duration::minutes(5))
            .unwrap();

        assert!(path.is_file());
        assert_eq!(store.list().notes.len(), 1);
    }

    #[test]
    fn test_update_rejects_modified_before_created() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store
            .create(Note::new("Clock").with_body("kept"), sample_time())
            .unwrap();
        let path = store.path_for(&id).unwrap();
        let before = fs::read(&path).unwrap();

        let earlier = sample_time() - Duration::hours(1);
        let err = store
            .update(&id, Note::new("Clock").with_body("lost"), earlier)
            .unwrap_err();

        match err {
            StoreError::TimestampBeforeCreated {
                id: err_id,
                created,
                modified,
            } => {
                assert_eq!(err_id, id);
                assert_eq!(created, sample_time());
                assert_eq!(modified, earlier);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_update_at_created_time_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Same Second"), sample_time()).unwrap();
        let written = store
            .update(&id, Note::new("Same Second"), sample_time())
            .unwrap();

        assert_eq!(written.created, written.modified);
    }

    #[test]
    fn test_update_corrupt_note_names_operation() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = "broken-20250122223045";
        let path = store.path_for(id).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "no frontmatter here").unwrap();

        let err = store
            .update(id, Note::new("x"), sample_time())
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Decode {
                op: "read existing note",
                ..
            }
        ));
        assert!(err.to_string().contains("read existing note"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "no frontmatter here");
    }

    #[test]
    fn test_update_missing_note() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let err = store
            .update("missing-20250122223045", Note::new("x"), sample_time())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.path_for("missing-20250122223045").unwrap().exists());
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Doomed"), sample_time()).unwrap();
        store.delete(&id).unwrap();

        assert!(!store.exists(&id).unwrap());
        assert!(store.read(&id).unwrap_err().is_not_found());
        assert!(store.delete(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_returns_all_notes() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create(Note::new("One"), sample_time()).unwrap();
        store
            .create(Note::new("Two"), sample_time() + Duration::days(40))
            .unwrap();
        store
            .create(Note::new("Three"), sample_time() + Duration::days(400))
            .unwrap();

        let listing = store.list();
        assert!(listing.is_complete());
        assert_eq!(listing.notes.len(), 3);

        let titles: Vec<_> = listing.notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_list_reports_corrupt_file_and_keeps_going() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create(Note::new("Good"), sample_time()).unwrap();
        store
            .create(Note::new("Also Good"), sample_time() + Duration::seconds(1))
            .unwrap();

        let bad = temp_dir.path().join("2025").join("01").join("bad-20250101000000.md");
        fs::write(&bad, "---\nid: [oops\n---\n").unwrap();

        let listing = store.list();
        assert_eq!(listing.notes.len(), 2);
        assert_eq!(listing.errors.len(), 1);

        let (path, err) = listing.failures().next().unwrap();
        assert_eq!(path, Some(&bad));
        assert!(matches!(
            err,
            StoreError::Decode {
                source: CodecError::MalformedMetadata(_),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_reports_unreadable_file_and_keeps_going() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create(Note::new("Readable"), sample_time()).unwrap();
        let locked_id = store
            .create(Note::new("Locked"), sample_time() + Duration::seconds(1))
            .unwrap();
        let locked = store.path_for(&locked_id).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file modes
        if fs::read(&locked).is_ok() {
            return;
        }

        let listing = store.list();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(listing.notes.len(), 1);
        assert_eq!(listing.notes[0].title, "Readable");
        assert_eq!(listing.errors.len(), 1);

        let (path, err) = listing.failures().next().unwrap();
        assert_eq!(path, Some(&locked));
        assert!(matches!(
            err,
            StoreError::PermissionDenied { op: "read", .. }
        ));
    }

    #[test]
    fn test_list_ignores_temp_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store.create(Note::new("Kept"), sample_time()).unwrap();
        let path = store.path_for(&id).unwrap();
        fs::write(temp_path_for(&path), "half a no").unwrap();
        fs::write(temp_dir.path().join("README.txt"), "not a note").unwrap();

        let listing = store.list();
        assert!(listing.is_complete());
        assert_eq!(listing.notes.len(), 1);
    }

    #[test]
    fn test_list_missing_vault_is_terminal_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = NoteStore::new(temp_dir.path().join("does-not-exist"));

        let listing = store.list();
        assert!(listing.notes.is_empty());
        assert_eq!(listing.errors.len(), 1);
        assert!(matches!(listing.errors[0], StoreError::Walk { .. }));
    }

    #[test]
    fn test_interrupted_write_leaves_target_intact() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let id = store
            .create(Note::new("Stable").with_body("original"), sample_time())
            .unwrap();
        let path = store.path_for(&id).unwrap();
        let before = fs::read(&path).unwrap();

        // A crash after the temp file is written but before the rename
        fs::write(temp_path_for(&path), "---\nid: torn\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.read(&id).unwrap().body, "original");

        // The next write replaces the stale temp file
        store
            .update(&id, Note::new("Stable").with_body("next"), sample_time())
            .unwrap();
        assert_eq!(store.read(&id).unwrap().body, "next");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_round_trip_through_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut note = Note::new("Full")
            .with_body("Line 1\n\nSee [[other-20240101000000]]")
            .with_tags(["a", "b"]);
        note.add_link("other-20240101000000");

        let id = store.create(note.clone(), sample_time()).unwrap();
        let stored = store.read(&id).unwrap();

        note.id = id;
        note.created = Some(sample_time());
        note.modified = Some(sample_time());
        assert_eq!(stored, note);
    }
}
