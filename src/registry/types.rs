//! Registry types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ingestion status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Error,
}

/// Narration-ready text of one page (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub text: String,
}

/// A document known to this process
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub path: PathBuf,
    pub status: DocumentStatus,
    /// Empty while processing
    pub pages: Vec<Page>,
    pub last_page: u32,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl Document {
    /// A freshly admitted document awaiting ingestion
    pub fn processing(id: String, filename: String, path: PathBuf) -> Self {
        Self {
            id,
            filename,
            path,
            status: DocumentStatus::Processing,
            pages: Vec::new(),
            last_page: 1,
            summary: None,
            error: None,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            total_pages: self.pages.len(),
            error: self.error.clone(),
            last_page: self.last_page,
        }
    }
}

/// Point-in-time status of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub status: DocumentStatus,
    pub total_pages: usize,
    pub error: Option<String>,
    pub last_page: u32,
}

/// Result of filename-based admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A document with this filename is already known
    Existing { id: String, status: DocumentStatus },
    /// A new document was registered in `processing`
    Created {
        id: String,
        path: PathBuf,
        /// Upload path of a failed document this one replaced
        replaced: Option<PathBuf>,
    },
}

/// Result of a page text lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLookup {
    Found(String),
    UnknownDocument,
    UnknownPage,
}
