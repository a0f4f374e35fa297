//! Library Store
//!
//! Durable index of ingested documents, kept as a single pretty-printed
//! JSON array. Every mutation rewrites the whole file through a temp file
//! and a rename in the same directory, so a crash mid-write leaves the
//! previous version intact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::types::{LibraryEntry, LibraryError};

/// JSON-file backed library
#[derive(Clone)]
pub struct LibraryStore {
    inner: Arc<LibraryStoreInner>,
}

struct LibraryStoreInner {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LibraryStoreInner {
                path: path.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Location of the library file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// All entries in stored order
    ///
    /// A missing file is an empty library. An unreadable file is logged and
    /// also reads as empty.
    pub async fn list_all(&self) -> Vec<LibraryEntry> {
        match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(path = %self.inner.path.display(), "Failed to read library: {}", e);
                Vec::new()
            }
        }
    }

    /// Insert or replace an entry by `doc_id`
    ///
    /// A replaced entry keeps its `last_page` and `added_at` unless the new
    /// entry supplies them. A new entry starts on page 1.
    pub async fn upsert(&self, mut entry: LibraryEntry) -> Result<(), LibraryError> {
        self.mutate(move |entries| {
            match entries.iter_mut().find(|e| e.doc_id == entry.doc_id) {
                Some(existing) => {
                    if entry.last_page.is_none() {
                        entry.last_page = existing.last_page;
                    }
                    if entry.added_at.is_none() {
                        entry.added_at = existing.added_at;
                    }
                    *existing = entry;
                }
                None => {
                    entry.last_page.get_or_insert(1);
                    entry.added_at.get_or_insert_with(Utc::now);
                    entries.push(entry);
                }
            }
            true
        })
        .await
        .map(|_| ())
    }

    /// Record the last page read. Returns false if the entry is absent.
    pub async fn update_progress(&self, doc_id: &str, page: u32) -> Result<bool, LibraryError> {
        self.mutate(|entries| match entries.iter_mut().find(|e| e.doc_id == doc_id) {
            Some(entry) => {
                entry.last_page = Some(page);
                true
            }
            None => false,
        })
        .await
    }

    /// Store a document summary. Returns false if the entry is absent.
    pub async fn set_summary(&self, doc_id: &str, summary: &str) -> Result<bool, LibraryError> {
        self.mutate(|entries| match entries.iter_mut().find(|e| e.doc_id == doc_id) {
            Some(entry) => {
                entry.summary = Some(summary.to_string());
                true
            }
            None => false,
        })
        .await
    }

    /// Remove an entry. Returns whether it was present.
    pub async fn delete(&self, doc_id: &str) -> Result<bool, LibraryError> {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|e| e.doc_id != doc_id);
            entries.len() != before
        })
        .await
    }

    /// Apply `f` under the write lock; rewrite the file only if it reports a change
    async fn mutate<F>(&self, f: F) -> Result<bool, LibraryError>
    where
        F: FnOnce(&mut Vec<LibraryEntry>) -> bool,
    {
        let _guard = self.inner.write_lock.lock().await;

        // Strict read: a corrupt file must not be replaced by a partial view
        let mut entries = self.read_entries().await?;
        let changed = f(&mut entries);
        if changed {
            self.write_entries(&entries).await?;
        }
        Ok(changed)
    }

    async fn read_entries(&self) -> Result<Vec<LibraryEntry>, LibraryError> {
        let bytes = match tokio::fs::read(&self.inner.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| LibraryError::Corrupt(e.to_string()))
    }

    async fn write_entries(&self, entries: &[LibraryEntry]) -> Result<(), LibraryError> {
        let json = serde_json::to_vec_pretty(entries)?;
        write_atomic(&self.inner.path, &json).await?;
        tracing::debug!(entries = entries.len(), "Library saved");
        Ok(())
    }
}

/// Write through a sibling temp file, then rename over the target
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    if let Err(e) = tokio::fs::write(&tmp_path, contents).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}
