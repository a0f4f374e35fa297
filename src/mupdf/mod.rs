//! Low-level MuPDF Wrapper
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. [`SafeDocument`] keeps only
//! the file path and reopens the document for every operation behind a
//! mutex; callers run those operations inside `spawn_blocking`.

mod safe;

pub use safe::SafeDocument;
