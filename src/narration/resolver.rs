//! Language & Voice Resolver
//!
//! Decides which text and voice a narration uses. With translation on,
//! English pages are read in Spanish and Spanish pages in English, each with
//! a fixed native voice. Anything that goes wrong falls back to the page as
//! written and the voice the reader asked for.

use std::sync::Arc;
use std::time::Duration;

use super::error::TranslationError;
use super::translate::{LanguageDetector, Translator};

/// Voice used for text translated into Spanish
pub const SPANISH_VOICE: &str = "es-AR-TomasNeural";
/// Voice used for text translated into English
pub const ENGLISH_VOICE: &str = "en-US-GuyNeural";

/// Effective text and voice for one narration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub voice: String,
    pub translated: bool,
}

impl Resolution {
    fn passthrough(text: &str, voice: &str) -> Self {
        Self {
            text: text.to_string(),
            voice: voice.to_string(),
            translated: false,
        }
    }
}

/// Target language and forced voice for a detected source language
fn translation_target(language: &str) -> Option<(&'static str, &'static str)> {
    let primary = language.split(['-', '_']).next().unwrap_or(language);
    match primary.to_lowercase().as_str() {
        "en" => Some(("es", SPANISH_VOICE)),
        "es" => Some(("en", ENGLISH_VOICE)),
        _ => None,
    }
}

pub struct VoiceResolver {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl VoiceResolver {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
        timeout: Duration,
    ) -> Self {
        Self {
            detector,
            translator,
            timeout,
        }
    }

    pub async fn resolve(&self, text: &str, requested_voice: &str, translate: bool) -> Resolution {
        if !translate || text.trim().is_empty() {
            return Resolution::passthrough(text, requested_voice);
        }

        match self.try_translate(text).await {
            Ok(Some((translated, voice))) => Resolution {
                text: translated,
                voice: voice.to_string(),
                translated: true,
            },
            Ok(None) => Resolution::passthrough(text, requested_voice),
            Err(e) => {
                tracing::warn!("Translation skipped, narrating original text: {}", e);
                Resolution::passthrough(text, requested_voice)
            }
        }
    }

    async fn try_translate(
        &self,
        text: &str,
    ) -> Result<Option<(String, &'static str)>, TranslationError> {
        let secs = self.timeout.as_secs();

        let language = tokio::time::timeout(self.timeout, self.detector.detect(text))
            .await
            .map_err(|_| TranslationError::Timeout(secs))??;

        let Some((target, voice)) = translation_target(&language) else {
            tracing::debug!(language = %language, "No translation pairing for language");
            return Ok(None);
        };

        let translated = tokio::time::timeout(self.timeout, self.translator.translate(text, target))
            .await
            .map_err(|_| TranslationError::Timeout(secs))??;

        tracing::debug!(from = %language, to = target, "Translated page text");
        Ok(Some((translated, voice)))
    }
}
