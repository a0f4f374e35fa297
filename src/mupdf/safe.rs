//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. This wrapper:
//!
//! 1. Stores the path of the uploaded file
//! 2. Opens a fresh document for each operation
//! 3. Uses `parking_lot::Mutex` to serialize access
//!
//! No `mupdf::Document` outlives the closure it was opened for.

use std::path::{Path, PathBuf};

use mupdf::Document;
use parking_lot::Mutex;

use crate::document::{DocumentError, DocumentFormat, DocumentResult};

/// Thread-safe document wrapper
pub struct SafeDocument {
    /// Location of the source file
    path: PathBuf,
    /// Document identifier
    id: String,
    /// Detected document format
    format: DocumentFormat,
    /// Cached page count
    page_count: usize,
    /// Mutex for serializing access
    lock: Mutex<()>,
}

impl SafeDocument {
    /// Open a document from a file path
    ///
    /// Opening also reads the page count, so a file MuPDF cannot parse is
    /// rejected here rather than on the first page.
    pub fn open<P: AsRef<Path>>(path: P, id: String) -> DocumentResult<Self> {
        let path = path.as_ref().to_path_buf();

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension)
            .ok_or_else(|| {
                DocumentError::UnsupportedFormat(format!("{}", path.display()))
            })?;

        let path_str = path.to_string_lossy();
        let doc = Document::open(&*path_str)
            .map_err(|e| DocumentError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        let page_count = doc
            .page_count()
            .map_err(|e| DocumentError::OpenFailed(format!("{}: {}", path.display(), e)))?
            as usize;

        Ok(Self {
            path,
            id,
            format,
            page_count,
            lock: Mutex::new(()),
        })
    }

    /// Get the document ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the document format
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Execute a closure with access to a freshly opened document
    ///
    /// ```ignore
    /// let text = safe_doc.with_doc(|doc| {
    ///     let page = doc.load_page(0)?;
    ///     Ok(page.to_text()?)
    /// })?;
    /// ```
    pub fn with_doc<F, R>(&self, f: F) -> DocumentResult<R>
    where
        F: FnOnce(&Document) -> DocumentResult<R>,
    {
        let _guard = self.lock.lock();

        let path_str = self.path.to_string_lossy();
        let doc = Document::open(&*path_str)?;

        f(&doc)
    }
}
