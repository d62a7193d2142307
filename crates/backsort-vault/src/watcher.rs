//! File system watcher that tells the caller when backlinks may have changed.
//!
//! Uses the `notify` crate for cross-platform file system events
//! (FSEvents on macOS, inotify on Linux, ReadDirectoryChanges on Windows).
//! Editors tend to emit several events per save, so [`VaultWatcher::next_batch`]
//! waits for a quiet period and hands back everything that arrived meanwhile.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use backsort_core::error::BacksortError;

/// Events emitted by the vault watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A markdown file was created or modified.
    Changed(PathBuf),
    /// A markdown file was deleted.
    Removed(PathBuf),
}

impl VaultEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Removed(path) => path,
        }
    }
}

/// Watches a vault directory for note changes and emits events.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<VaultEvent>,
}

impl VaultWatcher {
    /// Start watching a vault directory for changes.
    ///
    /// # Errors
    ///
    /// Returns [`BacksortError::Io`] if the watcher cannot be created.
    pub fn start(vault_root: &Path) -> backsort_core::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let vault_root_owned = vault_root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "vault watcher error");
                    return;
                }
            };
            for path in &event.paths {
                if !is_visible_note(&vault_root_owned, path) {
                    continue;
                }
                let vault_event = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => {
                        VaultEvent::Changed(path.clone())
                    }
                    EventKind::Remove(_) => VaultEvent::Removed(path.clone()),
                    _ => continue,
                };
                let _ = tx.send(vault_event);
            }
        })
        .map_err(|e| BacksortError::Io(std::io::Error::other(e)))?;

        watcher
            .watch(vault_root, RecursiveMode::Recursive)
            .map_err(|e| BacksortError::Io(std::io::Error::other(e)))?;

        tracing::debug!(root = %vault_root.display(), "watching vault");
        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Try to receive the next event with a timeout.
    ///
    /// Returns `None` if no event is available within the timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VaultEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Block until at least one event arrives, then keep collecting until
    /// `quiet` passes with no further events.
    ///
    /// Duplicate events are collapsed. Returns an empty batch only if the
    /// watcher has shut down.
    pub fn next_batch(&self, quiet: Duration) -> Vec<VaultEvent> {
        let Ok(first) = self.receiver.recv() else {
            return Vec::new();
        };
        let mut batch = vec![first];
        while let Ok(event) = self.receiver.recv_timeout(quiet) {
            if !batch.contains(&event) {
                batch.push(event);
            }
        }
        batch
    }
}

/// Markdown file outside hidden directories (`.obsidian`, `.trash`).
fn is_visible_note(vault_root: &Path, path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return false;
    }
    let hidden = path
        .strip_prefix(vault_root)
        .ok()
        .is_some_and(|rel| {
            rel.components()
                .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')))
        });
    !hidden
}
