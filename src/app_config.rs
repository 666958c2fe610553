use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::ConfigError;
use crate::language_utils;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// Validation runs once, at construction of the pipeline; a failure there is a
/// startup condition and never surfaces as a per-request error.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language used when a caller does not name one
    #[serde(default = "default_target_language")]
    pub default_target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Upload, preview and artifact settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Text-to-speech settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL
    DeepL,
    // @provider: Google Cloud Translation v2
    Google,
    // @provider: LibreTranslate (self-hostable)
    Libre,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Google => "Google",
            Self::Libre => "LibreTranslate",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepL => "deepl",
            Self::Google => "google",
            Self::Libre => "libre",
        }
    }

    /// Whether the provider refuses requests without an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Libre)
    }

    /// Environment variable consulted when the configured key is empty
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::DeepL => "DEEPL_API_KEY",
            Self::Google => "GOOGLE_API_KEY",
            Self::Libre => "LIBRETRANSLATE_API_KEY",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "google" => Ok(Self::Google),
            "libre" | "libretranslate" => Ok(Self::Libre),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: TranslationProvider,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let endpoint = match provider_type {
            TranslationProvider::DeepL => default_deepl_endpoint(),
            TranslationProvider::Google => default_google_endpoint(),
            TranslationProvider::Libre => default_libre_endpoint(),
        };

        Self {
            provider_type,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Endpoint with the provider default substituted when blank
    pub fn effective_endpoint(&self) -> String {
        if self.endpoint.trim().is_empty() {
            Self::new(self.provider_type).endpoint
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Providers tried in order until one succeeds
    #[serde(default = "default_provider_chain")]
    pub provider_chain: Vec<TranslationProvider>,

    /// Available translation providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Maximum UTF-16 code units accepted per translation request
    #[serde(default = "default_max_text_units")]
    pub max_text_units: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider_chain: default_provider_chain(),
            available_providers: default_available_providers(),
            max_text_units: default_max_text_units(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: TranslationProvider) -> Option<&ProviderConfig> {
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_type)
    }

    /// Provider configs in chain order
    pub fn chain_configs(&self) -> Result<Vec<&ProviderConfig>, ConfigError> {
        self.provider_chain
            .iter()
            .map(|provider| {
                self.get_provider_config(*provider)
                    .ok_or_else(|| ConfigError::MissingProviderConfig(provider.to_string()))
            })
            .collect()
    }
}

/// Pipeline limits and storage locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Hard ceiling on upload size
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Length of the text previews returned in an outcome
    #[serde(default = "default_preview_units")]
    pub preview_units: usize,

    /// Directory holding persisted artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Directory for staged uploads; the system temp dir when unset
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    /// Length of one subtitle cue window
    #[serde(default = "default_cue_duration_secs")]
    pub cue_duration_secs: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            preview_units: default_preview_units(),
            artifact_dir: default_artifact_dir(),
            staging_dir: None,
            cue_duration_secs: default_cue_duration_secs(),
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// External recognizer invoked as `<command> [args...] <audio path>`;
    /// the placeholder transcriber is used when unset
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Artificial latency of the placeholder transcriber
    #[serde(default = "default_placeholder_delay_ms")]
    pub placeholder_delay_ms: u64,

    /// Bound on one external recognizer run
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            placeholder_delay_ms: default_placeholder_delay_ms(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    #[serde(default = "String::new")]
    pub api_key: String,

    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_speech_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_provider_chain() -> Vec<TranslationProvider> {
    // DeepL first, Google as the fallback
    vec![TranslationProvider::DeepL, TranslationProvider::Google]
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(TranslationProvider::DeepL),
        ProviderConfig::new(TranslationProvider::Google),
        ProviderConfig::new(TranslationProvider::Libre),
    ]
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_text_units() -> usize {
    5000
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_preview_units() -> usize {
    500
}

fn default_cue_duration_secs() -> f64 {
    4.0
}

fn default_placeholder_delay_ms() -> u64 {
    2000
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_artifact_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("voicely")
        .join("artifacts")
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_libre_endpoint() -> String {
    "https://libretranslate.de".to_string()
}

fn default_speech_endpoint() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_target_language: default_target_language(),
            translation: TranslationConfig::default(),
            pipeline: PipelineConfig::default(),
            transcription: TranscriptionConfig::default(),
            speech: SpeechConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Fill empty API keys from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Fill empty API keys from an arbitrary lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider in &mut self.translation.available_providers {
            if provider.api_key.is_empty() {
                if let Some(key) = lookup(provider.provider_type.api_key_env()).filter(|k| !k.is_empty()) {
                    provider.api_key = key;
                }
            }
        }

        if self.speech.api_key.is_empty() {
            if let Some(key) = lookup("GOOGLE_TTS_API_KEY").filter(|k| !k.is_empty()) {
                self.speech.api_key = key;
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        language_utils::validate_language_code(&self.default_target_language)
            .map_err(|_| ConfigError::InvalidLanguage(self.default_target_language.clone()))?;

        if self.translation.provider_chain.is_empty() {
            return Err(ConfigError::EmptyProviderChain);
        }

        for provider in self.translation.chain_configs()? {
            let name = provider.provider_type.to_string();

            if provider.provider_type.requires_api_key() && provider.api_key.trim().is_empty() {
                return Err(ConfigError::MissingApiKey(name));
            }

            let endpoint = provider.effective_endpoint();
            if Url::parse(&endpoint).is_err() {
                return Err(ConfigError::InvalidEndpoint { name, endpoint });
            }

            if provider.timeout_secs == 0 {
                return Err(ConfigError::InvalidLimit(format!("timeout_secs for {}", name)));
            }
        }

        if self.translation.max_text_units == 0 {
            return Err(ConfigError::InvalidLimit("max_text_units".to_string()));
        }
        if self.pipeline.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_upload_bytes".to_string()));
        }
        if self.pipeline.preview_units == 0 {
            return Err(ConfigError::InvalidLimit("preview_units".to_string()));
        }
        if !(self.pipeline.cue_duration_secs > 0.0) {
            return Err(ConfigError::InvalidLimit("cue_duration_secs".to_string()));
        }

        Ok(())
    }
}
