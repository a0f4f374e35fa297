//! Library entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::Page;

/// One persisted document record
///
/// Field names match the on-disk `library.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub doc_id: String,
    pub filename: String,
    pub path: String,
    pub total_pages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl LibraryEntry {
    pub fn new(
        doc_id: impl Into<String>,
        filename: impl Into<String>,
        path: impl Into<String>,
        total_pages: usize,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            filename: filename.into(),
            path: path.into(),
            total_pages,
            last_page: None,
            summary: None,
            pages: None,
            added_at: None,
        }
    }

    /// Last page read, defaulting to the first
    pub fn resume_page(&self) -> u32 {
        self.last_page.unwrap_or(1)
    }
}

/// Library store errors
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Library IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library file is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize library: {0}")]
    Serialize(#[from] serde_json::Error),
}
