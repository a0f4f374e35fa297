//! Configuration management for Lectern Server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ocr::{OcrProvider, OcrServiceConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub speech: SpeechConfig,
    pub translation: TranslationConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub library_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub provider: OcrProvider,
    pub languages: Vec<String>,
    pub min_text_chars: usize,
    pub render_scale: f32,
    pub timeout_secs: u64,
    pub tesseract_cmd: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub default_voice: String,
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub model: String,
    pub sentences: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                audio_dir: PathBuf::from("audio_cache"),
                library_file: PathBuf::from("library.json"),
            },
            ocr: OcrConfig {
                provider: OcrProvider::Tesseract,
                languages: vec!["es".into(), "en".into(), "pt".into(), "fr".into()],
                min_text_chars: 50,
                render_scale: 1.0,
                timeout_secs: 120,
                tesseract_cmd: "tesseract".to_string(),
                ollama_url: "http://localhost:11434".to_string(),
                ollama_model: "llava".to_string(),
            },
            speech: SpeechConfig {
                url: "http://localhost:5050/v1/audio/speech".to_string(),
                api_key: None,
                model: "tts-1".to_string(),
                timeout_secs: 60,
                default_voice: "es-AR-TomasNeural".to_string(),
            },
            translation: TranslationConfig {
                url: "http://localhost:5000".to_string(),
                api_key: None,
                timeout_secs: 15,
            },
            summary: SummaryConfig {
                model: "llama3".to_string(),
                sentences: 5,
                timeout_secs: 120,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match lookup("OCR_PROVIDER") {
            Some(name) => OcrProvider::from_name(&name).ok_or(ConfigError::InvalidValue {
                key: "OCR_PROVIDER",
                value: name,
            })?,
            None => d.ocr.provider,
        };

        let languages = lookup("OCR_LANGUAGES")
            .map(|v| {
                v.split(',')
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|langs| !langs.is_empty())
            .unwrap_or(d.ocr.languages);

        let port = match lookup("SERVER_PORT") {
            Some(v) => parse("SERVER_PORT", v)?,
            None => parse_or(&lookup, "PORT", d.server.port)?,
        };

        Ok(Config {
            server: ServerConfig {
                host: string("SERVER_HOST", d.server.host),
                port,
            },
            storage: StorageConfig {
                upload_dir: path("UPLOAD_DIR", d.storage.upload_dir),
                audio_dir: path("AUDIO_DIR", d.storage.audio_dir),
                library_file: path("LIBRARY_FILE", d.storage.library_file),
            },
            ocr: OcrConfig {
                provider,
                languages,
                min_text_chars: parse_or(&lookup, "OCR_MIN_TEXT_CHARS", d.ocr.min_text_chars)?,
                render_scale: parse_or(&lookup, "OCR_RENDER_SCALE", d.ocr.render_scale)?,
                timeout_secs: parse_or(&lookup, "OCR_TIMEOUT_SECS", d.ocr.timeout_secs)?,
                tesseract_cmd: string("TESSERACT_CMD", d.ocr.tesseract_cmd),
                ollama_url: string("OLLAMA_URL", d.ocr.ollama_url),
                ollama_model: string("OLLAMA_VISION_MODEL", d.ocr.ollama_model),
            },
            speech: SpeechConfig {
                url: string("TTS_URL", d.speech.url),
                api_key: secret("TTS_API_KEY"),
                model: string("TTS_MODEL", d.speech.model),
                timeout_secs: parse_or(&lookup, "TTS_TIMEOUT_SECS", d.speech.timeout_secs)?,
                default_voice: string("DEFAULT_VOICE", d.speech.default_voice),
            },
            translation: TranslationConfig {
                url: string("TRANSLATE_URL", d.translation.url),
                api_key: secret("TRANSLATE_API_KEY"),
                timeout_secs: parse_or(&lookup, "TRANSLATE_TIMEOUT_SECS", d.translation.timeout_secs)?,
            },
            summary: SummaryConfig {
                model: string("SUMMARY_MODEL", d.summary.model),
                sentences: parse_or(&lookup, "SUMMARY_SENTENCES", d.summary.sentences)?,
                timeout_secs: parse_or(&lookup, "SUMMARY_TIMEOUT_SECS", d.summary.timeout_secs)?,
            },
        })
    }

    /// OCR service settings derived from this configuration
    pub fn ocr_service(&self) -> OcrServiceConfig {
        OcrServiceConfig {
            provider: self.ocr.provider,
            languages: self.ocr.languages.clone(),
            tesseract_cmd: self.ocr.tesseract_cmd.clone(),
            ollama_url: self.ocr.ollama_url.clone(),
            ollama_model: self.ocr.ollama_model.clone(),
            timeout_secs: self.ocr.timeout_secs,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => parse(key, value),
        None => Ok(default),
    }
}
