//! # backsort-vault
//!
//! Markdown vault access for backsort.
//!
//! A vault is a directory of markdown notes. This crate exposes it to the
//! resolver as a [`MetadataLookup`] (frontmatter + file mtime), finds the
//! notes that link to a given note, and watches the directory for changes.
//! Nothing here ever writes to the vault.

pub mod links;
pub mod watcher;

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use backsort_core::error::{BacksortError, Result};
use backsort_core::frontmatter::parse_frontmatter;
use backsort_core::metadata::{MetadataLookup, MetadataRecord};
use backsort_core::resolver::{NOTE_EXTENSION, UNKNOWN_TIMESTAMP};
use backsort_core::Settings;

pub use watcher::{VaultEvent, VaultWatcher};

/// Per-vault settings file, relative to the vault root.
pub const SETTINGS_FILE: &str = ".backsort.toml";

/// A note that links to the note whose backlinks were requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backlink {
    /// Display label: the linking note's title (file stem).
    pub label: String,
    /// Vault-relative path of the linking note.
    pub path: PathBuf,
}

/// A markdown vault rooted at a directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open an existing vault directory.
    ///
    /// # Errors
    ///
    /// Returns [`BacksortError::Vault`] if `root` is not a directory.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(BacksortError::Vault(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Settings stored in the vault's [`SETTINGS_FILE`], or defaults when
    /// the vault has none.
    ///
    /// # Errors
    ///
    /// Returns [`BacksortError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings::load_or_default(&self.root.join(SETTINGS_FILE))?)
    }

    /// Map a reference name to a file inside the vault.
    ///
    /// Absolute paths and references that climb out of the vault decline.
    fn resolve_reference(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference);
        let stays_inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if reference.is_empty() || !stays_inside {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Vault-relative paths of every markdown note, sorted.
    ///
    /// Hidden directories (`.obsidian`, `.trash`, ...) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BacksortError::Io`] if the vault root cannot be read.
    pub fn notes(&self) -> Result<Vec<PathBuf>> {
        let mut notes = Vec::new();
        collect_notes(&self.root, &self.root, &mut notes)?;
        notes.sort();
        Ok(notes)
    }

    /// Notes that contain a wikilink to `note`, in alphabetical order by label.
    ///
    /// `note` may be a bare title (`Project X`), a vault path
    /// (`Projects/Project X`) or either with `.md`. The note itself is
    /// never its own backlink.
    ///
    /// # Errors
    ///
    /// Returns [`BacksortError::Io`] if the vault cannot be listed.
    /// Unreadable individual notes are skipped with a warning.
    pub fn backlinks(&self, note: &str) -> Result<Vec<Backlink>> {
        let target = links::normalize_target(note);
        let target_name = links::note_name(&target);

        let mut backlinks = Vec::new();
        for path in self.notes()? {
            let label = note_label(&path);
            if label == target_name {
                continue;
            }

            let content = match fs::read_to_string(self.root.join(&path)) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable note");
                    continue;
                }
            };

            if links::extract_wikilinks(&content)
                .iter()
                .any(|link| links::links_to(link, &target))
            {
                backlinks.push(Backlink { label, path });
            }
        }

        backlinks.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.path.cmp(&b.path)));
        tracing::debug!(note = %target, count = backlinks.len(), "collected backlinks");
        Ok(backlinks)
    }
}

impl MetadataLookup for Vault {
    fn lookup(&self, reference: &str) -> Option<MetadataRecord> {
        let path = self.resolve_reference(reference)?;
        let meta = fs::metadata(&path).ok()?;
        if !meta.is_file() {
            return None;
        }

        let modified_ms = meta
            .modified()
            .ok()
            .map_or(UNKNOWN_TIMESTAMP, system_time_millis);

        let is_markdown = path.extension().and_then(|e| e.to_str()) == Some("md");
        let frontmatter = if is_markdown {
            read_frontmatter(&path)
        } else {
            None
        };

        Some(MetadataRecord {
            frontmatter,
            modified_ms,
        })
    }
}

fn read_frontmatter(path: &Path) -> Option<backsort_core::Frontmatter> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read note");
            return None;
        }
    };
    match parse_frontmatter(&content) {
        Ok(frontmatter) => frontmatter,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring malformed frontmatter");
            None
        }
    }
}

/// Milliseconds since the Unix epoch; negative before it.
fn system_time_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
    }
}

/// Display label of a note: its file name without `.md`.
fn note_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(NOTE_EXTENSION)
        .map(str::to_string)
        .unwrap_or(name)
}

fn collect_notes(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_notes(root, &path, out)?;
        } else if file_type.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Project X.md", "# Project X\n");
        write(
            root,
            "Meeting Notes.md",
            "---\nedited: 2025-10-07\ncreated: 2025-10-02\n---\nDiscussed [[Project X]].\n",
        );
        write(
            root,
            "Daily Notes/August 12th, 2025.md",
            "# [[August 12th, 2025]] leadership call\nsee [[Project X|X]]\n",
        );
        write(root, "Archive/Old.md", "[[Projects/Project X#Status]]\n");
        write(root, "Unrelated.md", "[[Project XYZ]] and [Project X]\n");
        write(root, ".trash/Deleted.md", "[[Project X]]\n");
        write(root, "notes.txt", "[[Project X]]\n");
        dir
    }

    #[test]
    fn open_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vault::open(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BacksortError::Vault(_)));
    }

    #[test]
    fn settings_default_when_file_missing() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();
        assert_eq!(vault.settings().unwrap(), Settings::default());
    }

    #[test]
    fn settings_read_from_vault_file() {
        let dir = fixture();
        write(dir.path(), SETTINGS_FILE, "sort_descending = false\n");
        let vault = Vault::open(dir.path()).unwrap();
        assert!(!vault.settings().unwrap().sort_descending);
    }

    #[test]
    fn invalid_settings_surface_as_config_error() {
        let dir = fixture();
        write(dir.path(), SETTINGS_FILE, "sort_descending = \"yes\"\n");
        let vault = Vault::open(dir.path()).unwrap();
        let err = vault.settings().unwrap_err();
        assert!(matches!(err, BacksortError::Config(_)));
        assert!(err.to_string().contains(SETTINGS_FILE));
    }

    #[test]
    fn lookup_reads_frontmatter_and_mtime() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();

        let record = vault.lookup("Meeting Notes.md").unwrap();
        assert_eq!(record.field("edited"), Some("2025-10-07"));
        assert_eq!(record.field("created"), Some("2025-10-02"));
        assert!(record.modified_ms > 0);
    }

    #[test]
    fn lookup_without_frontmatter_still_finds_record() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();

        let record = vault.lookup("Project X.md").unwrap();
        assert!(record.frontmatter.is_none());
    }

    #[test]
    fn lookup_tolerates_malformed_frontmatter() {
        let dir = fixture();
        write(dir.path(), "Broken.md", "---\nedited: [oops\n---\nbody\n");
        let vault = Vault::open(dir.path()).unwrap();

        let record = vault.lookup("Broken.md").unwrap();
        assert!(record.frontmatter.is_none());
    }

    #[test]
    fn lookup_declines_missing_directories_and_escapes() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();

        assert!(vault.lookup("Meeting Notes").is_none());
        assert!(vault.lookup("Daily Notes").is_none());
        assert!(vault.lookup("").is_none());
        assert!(vault.lookup("../Meeting Notes.md").is_none());
        assert!(vault.lookup("/etc/hostname").is_none());
    }

    #[test]
    fn lookup_finds_nested_daily_note() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();
        assert!(vault.lookup("Daily Notes/August 12th, 2025.md").is_some());
    }

    #[test]
    fn notes_skips_hidden_and_non_markdown() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();
        let notes = vault.notes().unwrap();

        assert!(notes.contains(&PathBuf::from("Meeting Notes.md")));
        assert!(notes.contains(&PathBuf::from("Archive").join("Old.md")));
        assert!(!notes.iter().any(|p| p.to_string_lossy().contains(".trash")));
        assert!(!notes.iter().any(|p| p.to_string_lossy().ends_with(".txt")));
    }

    #[test]
    fn backlinks_are_alphabetical_and_exclude_self() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();

        let labels: Vec<String> = vault
            .backlinks("Project X")
            .unwrap()
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(labels, vec!["August 12th, 2025", "Meeting Notes", "Old"]);
    }

    #[test]
    fn backlinks_accept_path_and_extension() {
        let dir = fixture();
        let vault = Vault::open(dir.path()).unwrap();

        let by_title = vault.backlinks("Project X").unwrap();
        assert_eq!(vault.backlinks("Project X.md").unwrap(), by_title);
        assert_eq!(vault.backlinks("Projects/Project X").unwrap(), by_title);
    }

    #[test]
    fn system_time_conversion_handles_both_sides_of_epoch() {
        assert_eq!(system_time_millis(UNIX_EPOCH + Duration::from_millis(1_500)), 1_500);
        assert_eq!(system_time_millis(UNIX_EPOCH - Duration::from_millis(2_000)), -2_000);
    }
}
