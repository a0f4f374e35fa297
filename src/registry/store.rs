//! Document Registry
//!
//! In-memory index of every document this process knows about. Owned by
//! the application state and shared by cloning.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{Admission, Document, DocumentStatus, Page, PageLookup, StatusSnapshot};
use crate::library::LibraryEntry;

/// Shared document index
#[derive(Clone, Default)]
pub struct DocumentRegistry {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from persisted library entries
    ///
    /// Every persisted entry comes back as `ready`.
    pub fn from_library(entries: Vec<LibraryEntry>) -> Self {
        let documents = entries
            .into_iter()
            .map(|entry| {
                if entry.pages.is_none() && entry.total_pages > 0 {
                    tracing::warn!(
                        doc_id = %entry.doc_id,
                        total_pages = entry.total_pages,
                        "Library entry has no stored pages; re-upload to restore its text"
                    );
                }
                let last_page = entry.resume_page();
                let doc = Document {
                    id: entry.doc_id.clone(),
                    filename: entry.filename,
                    path: PathBuf::from(entry.path),
                    status: DocumentStatus::Ready,
                    pages: entry.pages.unwrap_or_default(),
                    last_page,
                    summary: entry.summary,
                    error: None,
                };
                (entry.doc_id, doc)
            })
            .collect::<HashMap<_, _>>();

        tracing::info!(documents = documents.len(), "Registry restored from library");

        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Register a document in `processing`
    pub async fn create(&self, id: &str, filename: &str, path: PathBuf) {
        let doc = Document::processing(id.to_string(), filename.to_string(), path);
        self.documents.write().await.insert(id.to_string(), doc);
    }

    /// Admit an upload by filename
    ///
    /// Check and insert happen under one write lock, so two uploads of the
    /// same filename can never both create a document.
    pub async fn admit<F>(&self, filename: &str, make_path: F) -> Admission
    where
        F: FnOnce(&str) -> PathBuf,
    {
        let mut documents = self.documents.write().await;

        let existing = documents
            .values()
            .find(|d| d.filename == filename)
            .map(|d| (d.id.clone(), d.status));

        // A failed document is replaced, so re-uploading retries ingestion
        let replaced = match existing {
            Some((id, DocumentStatus::Error)) => {
                tracing::info!(doc_id = %id, filename = %filename, "Replacing failed document");
                documents.remove(&id).map(|d| d.path)
            }
            Some((id, status)) => return Admission::Existing { id, status },
            None => None,
        };

        let id = Uuid::new_v4().to_string();
        let path = make_path(&id);
        documents.insert(
            id.clone(),
            Document::processing(id.clone(), filename.to_string(), path.clone()),
        );

        Admission::Created { id, path, replaced }
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }

    pub async fn status(&self, id: &str) -> Option<StatusSnapshot> {
        self.documents.read().await.get(id).map(Document::snapshot)
    }

    pub async fn pages(&self, id: &str) -> Option<Vec<Page>> {
        self.documents.read().await.get(id).map(|d| d.pages.clone())
    }

    /// Text of a 1-based page
    pub async fn page_text(&self, id: &str, page: u32) -> PageLookup {
        let documents = self.documents.read().await;
        let Some(doc) = documents.get(id) else {
            return PageLookup::UnknownDocument;
        };
        match doc.pages.iter().find(|p| p.page == page) {
            Some(p) => PageLookup::Found(p.text.clone()),
            None => PageLookup::UnknownPage,
        }
    }

    /// Set the last page read. Returns false for an unknown document.
    pub async fn set_progress(&self, id: &str, page: u32) -> bool {
        match self.documents.write().await.get_mut(id) {
            Some(doc) => {
                doc.last_page = page;
                true
            }
            None => false,
        }
    }

    /// Forget a document. Absent ids are a no-op.
    pub async fn remove(&self, id: &str) -> bool {
        self.documents.write().await.remove(id).is_some()
    }

    /// Mark ingestion complete
    pub async fn publish_pages(&self, id: &str, pages: Vec<Page>) -> bool {
        match self.documents.write().await.get_mut(id) {
            Some(doc) => {
                doc.pages = pages;
                doc.status = DocumentStatus::Ready;
                doc.last_page = 1;
                doc.error = None;
                true
            }
            None => false,
        }
    }

    /// Mark ingestion failed
    pub async fn mark_failed(&self, id: &str, message: impl Into<String>) -> bool {
        match self.documents.write().await.get_mut(id) {
            Some(doc) => {
                doc.status = DocumentStatus::Error;
                doc.error = Some(message.into());
                true
            }
            None => false,
        }
    }

    pub async fn summary(&self, id: &str) -> Option<Option<String>> {
        self.documents.read().await.get(id).map(|d| d.summary.clone())
    }

    pub async fn set_summary(&self, id: &str, summary: &str) -> bool {
        match self.documents.write().await.get_mut(id) {
            Some(doc) => {
                doc.summary = Some(summary.to_string());
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
