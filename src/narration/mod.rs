//! Page narration
//!
//! Resolves the effective text and voice for a page, then serves the
//! matching audio from the on-disk cache or synthesizes it.
//!
//! ```text
//!   raw text ──► normalize ──► VoiceResolver ──► NarrationKey
//!                                                    │
//!                              file exists? ◄────────┘
//!                              │yes        │no
//!                              ▼           ▼
//!                           serve     SpeechSynthesizer ──► temp ──► rename
//! ```

mod cache;
mod error;
mod resolver;
mod speech;
mod translate;
mod voices;

pub use cache::{placeholder_for, NarrationArtifact, NarrationCache, NarrationKey};
pub use error::{NarrationError, SynthesisError, TranslationError};
pub use resolver::{Resolution, VoiceResolver, ENGLISH_VOICE, SPANISH_VOICE};
pub use speech::{HttpSpeechSynthesizer, SpeechSynthesizer};
pub use translate::{LanguageDetector, LibreTranslateClient, Translator};
pub use voices::{Voice, VOICES};

#[cfg(test)]
pub(crate) use cache::mock::EchoSynthesizer;
#[cfg(test)]
pub(crate) use resolver::mock::ScriptedTranslation;
