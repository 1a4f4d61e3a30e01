use crate::catalog;
use crate::defaults;
use crate::error::{RedubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub dub: DubConfig,
    pub api: ApiConfig,
    pub media: MediaConfig,
}

/// What to dub into and how much of it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DubConfig {
    pub target_language: String,
    pub voice: String,
    pub max_minutes: u32,
    pub chunk_secs: u32,
    pub parallel_chunks: usize,
    pub output_dir: Option<PathBuf>,
    pub keep_work: bool,
}

/// Speech and translation service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub transcription_model: String,
    pub translation_model: String,
    pub speech_model: String,
    pub timeout_secs: Option<u64>,
}

/// Media engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    pub ffmpeg: String,
    pub work_dir: Option<PathBuf>,
}

impl Default for DubConfig {
    fn default() -> Self {
        Self {
            target_language: defaults::DEFAULT_LANGUAGE.to_string(),
            voice: catalog::default_voice().name.to_string(),
            max_minutes: defaults::MAX_MINUTES,
            chunk_secs: defaults::CHUNK_SECS,
            parallel_chunks: defaults::PARALLEL_CHUNKS,
            output_dir: None,
            keep_work: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            api_key: None,
            transcription_model: defaults::TRANSCRIPTION_MODEL.to_string(),
            translation_model: defaults::TRANSLATION_MODEL.to_string(),
            speech_model: defaults::SPEECH_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG.to_string(),
            work_dir: None,
        }
    }
}

impl MediaConfig {
    /// Working area for the current run, falling back to `~/.cache/redub/work`.
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("redub")
                .join("work")
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(RedubError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Write configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RedubError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - REDUB_API_KEY (or OPENAI_API_KEY) → api.api_key
    /// - REDUB_BASE_URL → api.base_url
    /// - REDUB_LANGUAGE → dub.target_language
    /// - REDUB_VOICE → dub.voice
    /// - REDUB_FFMPEG → media.ffmpeg
    pub fn with_env_overrides(mut self) -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        if let Some(key) = non_empty("REDUB_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = non_empty("REDUB_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(language) = non_empty("REDUB_LANGUAGE") {
            self.dub.target_language = language;
        }
        if let Some(voice) = non_empty("REDUB_VOICE") {
            self.dub.voice = voice;
        }
        if let Some(ffmpeg) = non_empty("REDUB_FFMPEG") {
            self.media.ffmpeg = ffmpeg;
        }

        self
    }

    /// Check values that serde cannot: catalog membership and ranges.
    ///
    /// `max_minutes` is not rejected here; the budgeter clamps it.
    pub fn validate(&self) -> Result<()> {
        if catalog::get_language(&self.dub.target_language).is_none() {
            return Err(RedubError::UnsupportedLanguage {
                code: self.dub.target_language.clone(),
            });
        }
        if catalog::get_voice(&self.dub.voice).is_none() {
            return Err(RedubError::UnknownVoice {
                name: self.dub.voice.clone(),
            });
        }
        if self.dub.chunk_secs == 0 {
            return Err(RedubError::ConfigInvalidValue {
                key: "dub.chunk_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.dub.parallel_chunks == 0 {
            return Err(RedubError::ConfigInvalidValue {
                key: "dub.parallel_chunks".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.api.base_url.trim().is_empty() {
            return Err(RedubError::ConfigInvalidValue {
                key: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Read a value by dotted key (e.g. `dub.voice`).
    pub fn get(&self, key: &str) -> Result<toml::Value> {
        let root = self.to_value()?;
        let mut current = &root;
        for part in key.split('.') {
            current = current.get(part).ok_or_else(|| unknown_key(key))?;
        }
        Ok(current.clone())
    }

    /// Set a value by dotted key. The value is parsed as TOML, falling back to a plain string.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = self.to_value()?;
        let (section, field) = key.split_once('.').ok_or_else(|| unknown_key(key))?;
        let table = root
            .get_mut(section)
            .and_then(toml::Value::as_table_mut)
            .ok_or_else(|| unknown_key(key))?;

        let value = parse_value(raw);
        table.insert(field.to_string(), value);

        let updated: Config = root.try_into().map_err(|e: toml::de::Error| {
            RedubError::ConfigInvalidValue {
                key: key.to_string(),
                message: e.message().to_string(),
            }
        })?;

        // Unknown fields are silently dropped by serde(default); catch that here.
        if updated.get(key).is_err() {
            return Err(unknown_key(key));
        }
        *self = updated;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/redub/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("redub")
            .join("config.toml")
    }

    fn to_value(&self) -> Result<toml::Value> {
        toml::Value::try_from(self).map_err(|e| RedubError::ConfigParse {
            message: e.to_string(),
        })
    }
}

fn unknown_key(key: &str) -> RedubError {
    RedubError::ConfigInvalidValue {
        key: key.to_string(),
        message: "unknown configuration key".to_string(),
    }
}

fn parse_value(raw: &str) -> toml::Value {
    let wrapped = format!("v = {raw}");
    toml::from_str::<toml::Table>(&wrapped)
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}
