use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::{http_client, status_error, transport_error};
use crate::errors::ProviderError;
use crate::speech::{
    ResolvedSpeech, SpeechError, SpeechResult, SpeechSynthesizer, VoiceInfo, VoicesByLanguage, group_voices_by_language,
};

/// Google Cloud Text-to-Speech client (REST, API-key auth)
#[derive(Debug)]
pub struct GoogleSpeech {
    client: Client,
    api_key: String,
    endpoint: String,
}

/// `text:synthesize` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
    pub audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: String,
    pub speaking_rate: f64,
    pub pitch: f64,
}

/// `text:synthesize` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    #[serde(default)]
    pub audio_content: Option<String>,
}

/// `voices` response body
#[derive(Debug, Deserialize)]
pub struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<VoiceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEntry {
    #[serde(default)]
    pub language_codes: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub ssml_gender: String,
    #[serde(default)]
    pub natural_sample_rate_hertz: u32,
}

impl SynthesizeRequest {
    pub fn from_resolved(speech: &ResolvedSpeech) -> Self {
        Self {
            input: SynthesisInput { text: speech.text.clone() },
            voice: VoiceSelection {
                language_code: speech.language_code.clone(),
                name: speech.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: speech.audio_encoding.clone(),
                speaking_rate: speech.speaking_rate,
                pitch: speech.pitch,
            },
        }
    }
}

impl GoogleSpeech {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    async fn synthesize(&self, speech: &ResolvedSpeech) -> Result<SpeechResult, SpeechError> {
        let api_url = format!("{}/v1/text:synthesize", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SynthesizeRequest::from_resolved(speech))
            .send()
            .await
            .map_err(|e| transport_error("Google TTS", e))?;

        if !response.status().is_success() {
            return Err(status_error("Google TTS", response).await.into());
        }

        let body = response
            .json::<SynthesizeResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google TTS response: {}", e)))?;

        let audio_base64 = body
            .audio_content
            .filter(|audio| !audio.is_empty())
            .ok_or(SpeechError::NoAudioContent)?;

        Ok(SpeechResult {
            audio_base64,
            audio_encoding: speech.audio_encoding.clone(),
            language_code: speech.language_code.clone(),
            voice_name: speech.voice_name.clone(),
        })
    }

    async fn list_voices(&self) -> Result<VoicesByLanguage, SpeechError> {
        let api_url = format!("{}/v1/voices", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&api_url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| transport_error("Google TTS", e))?;

        if !response.status().is_success() {
            return Err(status_error("Google TTS", response).await.into());
        }

        let body = response
            .json::<VoicesResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google TTS voices: {}", e)))?;

        Ok(group_voices_by_language(body.voices.into_iter().map(|voice| {
            (
                voice.language_codes,
                VoiceInfo {
                    name: voice.name,
                    gender: voice.ssml_gender,
                    natural_sample_rate_hertz: voice.natural_sample_rate_hertz,
                },
            )
        })))
    }
}
