//! Narration Cache
//!
//! File-backed memo of synthesized page audio. The presence of a file at
//! the key's path is the only token: once written, an artifact is served
//! as-is and never re-validated against the page text.
//!
//! Concurrent misses on the same key wait on a shared per-key lock, so the
//! speech engine runs once. Artifacts are written to a temp file and renamed
//! into place, so a reader never sees a partial file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::error::{NarrationError, SynthesisError};
use super::resolver::{Resolution, VoiceResolver};
use super::speech::SpeechSynthesizer;
use crate::ingest::normalize_text;
use crate::library::write_atomic;

const SPANISH_PLACEHOLDER: &str = "Sin texto en esta página.";
const ENGLISH_PLACEHOLDER: &str = "No text on this page.";

/// Identity of one narration artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NarrationKey {
    pub doc_id: String,
    pub page: u32,
    pub voice: String,
    pub translated: bool,
}

impl NarrationKey {
    /// `{doc_id}_p{page}_{voice}_smooth[_trans].mp3`, with id and voice
    /// percent-encoded
    pub fn file_name(&self) -> String {
        format!(
            "{}_p{}_{}_smooth{}.mp3",
            urlencoding::encode(&self.doc_id),
            self.page,
            urlencoding::encode(&self.voice),
            if self.translated { "_trans" } else { "" }
        )
    }
}

/// A stored narration
#[derive(Debug, Clone)]
pub struct NarrationArtifact {
    pub path: PathBuf,
    pub key: NarrationKey,
    /// False only for the request that actually ran synthesis
    pub cache_hit: bool,
}

/// Spoken in place of a blank page
pub fn placeholder_for(voice: &str) -> &'static str {
    if voice.to_lowercase().starts_with("es") {
        SPANISH_PLACEHOLDER
    } else {
        ENGLISH_PLACEHOLDER
    }
}

#[derive(Clone)]
pub struct NarrationCache {
    inner: Arc<NarrationCacheInner>,
}

struct NarrationCacheInner {
    dir: PathBuf,
    resolver: VoiceResolver,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    timeout: Duration,
    in_flight: parking_lot::Mutex<HashMap<NarrationKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl NarrationCache {
    pub fn new(
        dir: impl Into<PathBuf>,
        resolver: VoiceResolver,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(NarrationCacheInner {
                dir: dir.into(),
                resolver,
                synthesizer,
                timeout,
                in_flight: parking_lot::Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn path_for(&self, key: &NarrationKey) -> PathBuf {
        self.inner.dir.join(key.file_name())
    }

    /// Return the narration for a page, synthesizing it on a miss
    pub async fn get_or_synthesize(
        &self,
        doc_id: &str,
        page: u32,
        raw_text: &str,
        requested_voice: &str,
        translate: bool,
    ) -> Result<NarrationArtifact, NarrationError> {
        let text = normalize_text(raw_text);
        let resolution = self.inner.resolver.resolve(&text, requested_voice, translate).await;

        let key = NarrationKey {
            doc_id: doc_id.to_string(),
            page,
            voice: resolution.voice.clone(),
            translated: resolution.translated,
        };
        let path = self.path_for(&key);

        if exists(&path).await {
            tracing::debug!(file = %key.file_name(), "Narration cache hit");
            return Ok(NarrationArtifact {
                path,
                key,
                cache_hit: true,
            });
        }

        // Detached so a dropped request still leaves the artifact behind
        let cache = self.clone();
        tokio::spawn(async move { cache.fill(key, path, resolution).await })
            .await
            .map_err(|e| NarrationError::Task(e.to_string()))?
    }

    async fn fill(
        &self,
        key: NarrationKey,
        path: PathBuf,
        resolution: Resolution,
    ) -> Result<NarrationArtifact, NarrationError> {
        let lock = self
            .inner
            .in_flight
            .lock()
            .entry(key.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        let result = self.synthesize_into(&key, &path, &resolution).await;

        self.inner.in_flight.lock().remove(&key);

        result.map(|cache_hit| NarrationArtifact {
            path,
            key,
            cache_hit,
        })
    }

    /// Returns true if another request stored the artifact first
    async fn synthesize_into(
        &self,
        key: &NarrationKey,
        path: &Path,
        resolution: &Resolution,
    ) -> Result<bool, NarrationError> {
        if exists(path).await {
            return Ok(true);
        }

        let text = if resolution.text.trim().is_empty() {
            placeholder_for(&resolution.voice)
        } else {
            resolution.text.as_str()
        };

        tracing::info!(
            doc_id = %key.doc_id,
            page = key.page,
            voice = %key.voice,
            translated = key.translated,
            "Synthesizing narration"
        );

        let audio = tokio::time::timeout(
            self.inner.timeout,
            self.inner.synthesizer.synthesize(text, &resolution.voice),
        )
        .await
        .map_err(|_| SynthesisError::Timeout(self.inner.timeout.as_secs()))??;

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio.into());
        }

        write_atomic(path, &audio).await?;
        Ok(false)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
