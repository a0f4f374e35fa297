//! Library persistence
//!
//! The library file outlives the process: the registry is rebuilt from it
//! at startup, and reading progress and summaries are written back to it.

mod store;
mod types;

pub(crate) use store::write_atomic;
pub use store::LibraryStore;
pub use types::{LibraryEntry, LibraryError};
