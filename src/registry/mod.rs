//! Document registry

mod store;
mod types;

pub use store::DocumentRegistry;
pub use types::{Admission, Document, DocumentStatus, Page, PageLookup, StatusSnapshot};
