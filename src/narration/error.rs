//! Narration error types

/// Speech engine failures
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Speech engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Speech engine returned no audio")]
    EmptyAudio,

    #[error("Speech synthesis timed out after {0} seconds")]
    Timeout(u64),
}

/// Language detection and translation failures
///
/// Never surfaced to callers: the resolver falls back to the original text.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not detect language")]
    Undetected,

    #[error("Translation timed out after {0} seconds")]
    Timeout(u64),
}

/// Narration cache failures
#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("Failed to store narration: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Narration task failed: {0}")]
    Task(String),
}
