/*!
 * Text-to-speech request handling.
 *
 * Requests are validated and normalised here (voice defaults, rate and pitch
 * clamping) before being handed to a `SpeechSynthesizer`.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::errors::ProviderError;
use crate::translation::utf16_len;

pub const MIN_SPEAKING_RATE: f64 = 0.25;
pub const MAX_SPEAKING_RATE: f64 = 4.0;
pub const MIN_PITCH: f64 = -20.0;
pub const MAX_PITCH: f64 = 20.0;

// @const: Preferred voice per locale
const DEFAULT_VOICES: &[(&str, &str)] = &[
    ("en-US", "en-US-Wavenet-D"),
    ("tr-TR", "tr-TR-Wavenet-A"),
    ("es-ES", "es-ES-Wavenet-A"),
    ("fr-FR", "fr-FR-Wavenet-A"),
    ("de-DE", "de-DE-Wavenet-A"),
    ("it-IT", "it-IT-Wavenet-A"),
    ("pt-PT", "pt-PT-Wavenet-A"),
    ("ru-RU", "ru-RU-Wavenet-A"),
    ("ja-JP", "ja-JP-Wavenet-A"),
    ("ko-KR", "ko-KR-Wavenet-A"),
    ("zh-CN", "zh-CN-Wavenet-A"),
];

/// Errors raised by speech synthesis
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Text is required and must not be empty")]
    EmptyText,

    #[error("Text too long for TTS: {length} units (max {limit})")]
    InputTooLong { length: usize, limit: usize },

    #[error("Text-to-speech failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("No audio content received from the speech provider")]
    NoAudioContent,
}

/// Caller-facing synthesis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default = "default_audio_encoding")]
    pub audio_encoding: String,
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,
    #[serde(default)]
    pub pitch: f64,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_code: default_language_code(),
            voice_name: None,
            audio_encoding: default_audio_encoding(),
            speaking_rate: default_speaking_rate(),
            pitch: 0.0,
        }
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    pub fn voice(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }

    pub fn speaking_rate(mut self, rate: f64) -> Self {
        self.speaking_rate = rate;
        self
    }

    pub fn pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    /// Validate and fill defaults, producing what goes on the wire
    pub fn resolve(&self, max_units: usize) -> Result<ResolvedSpeech, SpeechError> {
        if self.text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let length = utf16_len(&self.text);
        if length > max_units {
            return Err(SpeechError::InputTooLong { length, limit: max_units });
        }

        Ok(ResolvedSpeech {
            text: self.text.clone(),
            language_code: self.language_code.clone(),
            voice_name: self
                .voice_name
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default_voice(&self.language_code)),
            audio_encoding: self.audio_encoding.clone(),
            speaking_rate: clamp(self.speaking_rate, MIN_SPEAKING_RATE, MAX_SPEAKING_RATE, 1.0),
            pitch: clamp(self.pitch, MIN_PITCH, MAX_PITCH, 0.0),
        })
    }
}

/// Validated synthesis parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpeech {
    pub text: String,
    pub language_code: String,
    pub voice_name: String,
    pub audio_encoding: String,
    pub speaking_rate: f64,
    pub pitch: f64,
}

/// Synthesized audio, base64 encoded as returned by the provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResult {
    pub audio_base64: String,
    pub audio_encoding: String,
    pub language_code: String,
    pub voice_name: String,
}

/// One voice offered by a speech backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    pub name: String,
    pub gender: String,
    pub natural_sample_rate_hertz: u32,
}

/// Voices keyed by language code; a voice speaking several languages is
/// listed under each of them
pub type VoicesByLanguage = BTreeMap<String, Vec<VoiceInfo>>;

/// Capability implemented by text-to-speech backends
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, speech: &ResolvedSpeech) -> Result<SpeechResult, SpeechError>;

    /// Voices the backend can speak with, grouped by language
    async fn list_voices(&self) -> Result<VoicesByLanguage, SpeechError>;
}

/// Group `(language codes, voice)` pairs by language code
pub fn group_voices_by_language<I>(voices: I) -> VoicesByLanguage
where
    I: IntoIterator<Item = (Vec<String>, VoiceInfo)>,
{
    let mut grouped = VoicesByLanguage::new();
    for (language_codes, voice) in voices {
        for code in language_codes {
            grouped.entry(code).or_default().push(voice.clone());
        }
    }
    grouped
}

/// Voice used when the caller does not pick one
pub fn default_voice(language_code: &str) -> String {
    DEFAULT_VOICES
        .iter()
        .find(|(locale, _)| *locale == language_code)
        .map(|(_, voice)| voice.to_string())
        .unwrap_or_else(|| format!("{}-Wavenet-A", language_code))
}

fn clamp(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() { fallback } else { value.clamp(min, max) }
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_audio_encoding() -> String {
    "MP3".to_string()
}

fn default_speaking_rate() -> f64 {
    1.0
}
