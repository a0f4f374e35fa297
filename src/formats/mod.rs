//! Format-specific document implementations
//!
//! Each format module provides a [`crate::document::SourceOpener`] and the
//! matching [`crate::document::PageSource`], wrapping the lower-level MuPDF
//! bindings.

pub mod pdf;
