//! OCR Providers
//!
//! Defines the recognition engine trait and the engines behind it. Engines
//! are built once by [`super::OpticalFallback`]; construction does the
//! expensive probing so `recognize` stays cheap.

use std::collections::HashSet;

use async_trait::async_trait;

use super::types::{tesseract_language, OcrError};

/// An initialized recognition engine
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Recognize text in a PNG image, returning fragments in reading order
    async fn recognize(
        &self,
        image_png: &[u8],
        language_hints: &[String],
    ) -> Result<Vec<String>, OcrError>;
}

/// Split engine output into non-empty trimmed lines
fn fragments_from_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tesseract CLI engine
pub struct TesseractEngine {
    command: String,
    /// Traineddata names reported by `--list-langs`
    installed: HashSet<String>,
    /// `-l` argument used when a call carries no usable hints
    default_languages: String,
}

impl TesseractEngine {
    /// Probe the binary and its installed languages
    pub async fn initialize(command: &str, language_hints: &[String]) -> Result<Self, OcrError> {
        let version = tokio::process::Command::new(command)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                OcrError::ProviderNotAvailable(format!("Failed to run {}: {}", command, e))
            })?;
        if !version.status.success() {
            return Err(OcrError::ProviderNotAvailable(format!(
                "{} --version exited with {}",
                command, version.status
            )));
        }

        let listing = tokio::process::Command::new(command)
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| OcrError::InitializationFailed(format!("Failed to list languages: {}", e)))?;

        // Tesseract prints the header line on stderr or stdout depending on version
        let installed: HashSet<String> = String::from_utf8_lossy(&listing.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("List of"))
            .map(str::to_string)
            .collect();

        let mut engine = Self {
            command: command.to_string(),
            installed,
            default_languages: String::new(),
        };

        engine.default_languages = engine
            .language_arg(language_hints)
            .ok_or_else(|| {
                OcrError::InitializationFailed(format!(
                    "None of the requested languages {:?} are installed",
                    language_hints
                ))
            })?;

        tracing::info!(
            languages = %engine.default_languages,
            "Tesseract engine initialized"
        );

        Ok(engine)
    }

    /// Build the `-l` argument from ISO hints, keeping installed languages only
    fn language_arg(&self, hints: &[String]) -> Option<String> {
        let mut seen = HashSet::new();
        let langs: Vec<&str> = hints
            .iter()
            .filter_map(|h| tesseract_language(h))
            .filter(|l| self.installed.is_empty() || self.installed.contains(*l))
            .filter(|l| seen.insert(*l))
            .collect();

        if langs.is_empty() {
            None
        } else {
            Some(langs.join("+"))
        }
    }
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(
        &self,
        image_png: &[u8],
        language_hints: &[String],
    ) -> Result<Vec<String>, OcrError> {
        let langs = self
            .language_arg(language_hints)
            .unwrap_or_else(|| self.default_languages.clone());

        let input_path = std::env::temp_dir().join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&input_path, image_png)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = tokio::process::Command::new(&self.command)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(&langs)
            .arg("--psm")
            .arg("3")
            .output()
            .await;

        let _ = tokio::fs::remove_file(&input_path).await;

        let output = output
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!("Tesseract failed: {}", stderr)));
        }

        Ok(fragments_from_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Ollama vision model engine
pub struct OllamaEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEngine {
    /// Check the Ollama endpoint is reachable
    pub async fn initialize(base_url: &str, model: &str) -> Result<Self, OcrError> {
        let client = reqwest::Client::new();
        let url = format!("{}/api/tags", base_url.trim_end_matches('/'));

        let response = client.get(&url).send().await.map_err(|e| {
            OcrError::ProviderNotAvailable(format!("Ollama unreachable at {}: {}", base_url, e))
        })?;
        if !response.status().is_success() {
            return Err(OcrError::ProviderNotAvailable(format!(
                "Ollama returned {} for {}",
                response.status(),
                url
            )));
        }

        tracing::info!(model = %model, "Ollama OCR engine initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl RecognitionEngine for OllamaEngine {
    async fn recognize(
        &self,
        image_png: &[u8],
        language_hints: &[String],
    ) -> Result<Vec<String>, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_png);

        let lang_hint = if language_hints.is_empty() {
            String::new()
        } else {
            format!(" The text may be in one of: {}.", language_hints.join(", "))
        };

        let prompt = format!(
            "Extract all text from this image exactly as written.{} Return only the extracted text, nothing else.",
            lang_hint
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!("Ollama returned {}: {}", status, body)));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(fragments_from_output(result["response"].as_str().unwrap_or("")))
    }
}

/// Mock engine for testing: maps bitmap bytes to scripted fragments
#[cfg(test)]
pub struct MockEngine {
    pub responses: std::collections::HashMap<Vec<u8>, Vec<String>>,
    pub fail: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockEngine {
    pub fn new() -> Self {
        Self {
            responses: std::collections::HashMap::new(),
            fail: false,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn respond(mut self, image: &[u8], fragments: &[&str]) -> Self {
        self.responses.insert(
            image.to_vec(),
            fragments.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[cfg(test)]
#[async_trait]
impl RecognitionEngine for MockEngine {
    async fn recognize(
        &self,
        image_png: &[u8],
        _language_hints: &[String],
    ) -> Result<Vec<String>, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail {
            return Err(OcrError::ProcessingError("scripted failure".into()));
        }
        Ok(self.responses.get(image_png).cloned().unwrap_or_default())
    }
}
