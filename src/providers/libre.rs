use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{ProviderTranslation, TranslationBackend, http_client, status_error, transport_error};

/// LibreTranslate client; the API key is optional on most instances
#[derive(Debug)]
pub struct Libre {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct LibreRequest {
    pub q: String,
    pub source: String,
    pub target: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibreResponse {
    #[serde(default)]
    pub translated_text: String,
    #[serde(default)]
    pub detected_language: Option<LibreDetectedLanguage>,
}

#[derive(Debug, Deserialize)]
pub struct LibreDetectedLanguage {
    pub language: String,
}

impl Libre {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn build_request(&self, text: &str, target: &str, source: Option<&str>) -> LibreRequest {
        LibreRequest {
            q: text.to_string(),
            source: source
                .map(language_utils::to_lowercase_code)
                .unwrap_or_else(|| "auto".to_string()),
            target: language_utils::to_lowercase_code(target),
            format: "text".to_string(),
            api_key: Some(self.api_key.clone()).filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl TranslationBackend for Libre {
    fn name(&self) -> &str {
        "libre"
    }

    async fn submit(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<ProviderTranslation, ProviderError> {
        let api_url = format!("{}/translate", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .json(&self.build_request(text, target, source))
            .send()
            .await
            .map_err(|e| transport_error("LibreTranslate", e))?;

        if !response.status().is_success() {
            return Err(status_error("LibreTranslate", response).await);
        }

        let body = response
            .json::<LibreResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("LibreTranslate response: {}", e)))?;

        Ok(ProviderTranslation {
            text: body.translated_text,
            detected_source_language: body.detected_language.map(|d| d.language),
        })
    }
}
