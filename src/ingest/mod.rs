//! Document ingestion
//!
//! Extraction with optical fallback, page normalization and publication to
//! the registry and library.

mod normalize;
mod pipeline;

pub use normalize::{is_text_poor, normalize_text};
pub use pipeline::{IngestConfig, IngestError, IngestionPipeline};
