use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{ProviderTranslation, TranslationBackend, http_client, status_error, transport_error};

/// Google Cloud Translation (v2, API-key auth) client
#[derive(Debug)]
pub struct Google {
    client: Client,
    api_key: String,
    endpoint: String,
}

/// Google translate request body
#[derive(Debug, Serialize)]
pub struct GoogleRequest {
    pub q: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub format: String,
}

/// Google translate response envelope
#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    #[serde(default)]
    pub data: Option<GoogleData>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleData {
    #[serde(default)]
    pub translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTranslation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

impl Google {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn build_request(text: &str, target: &str, source: Option<&str>) -> GoogleRequest {
        GoogleRequest {
            q: text.to_string(),
            target: language_utils::to_lowercase_code(target),
            source: source.map(language_utils::to_lowercase_code),
            format: "text".to_string(),
        }
    }
}

#[async_trait]
impl TranslationBackend for Google {
    fn name(&self) -> &str {
        "google"
    }

    async fn submit(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<ProviderTranslation, ProviderError> {
        let api_url = format!("{}/language/translate/v2", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request(text, target, source))
            .send()
            .await
            .map_err(|e| transport_error("Google", e))?;

        if !response.status().is_success() {
            return Err(status_error("Google", response).await);
        }

        let body = response
            .json::<GoogleResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google response: {}", e)))?;

        let first = body.data.and_then(|d| d.translations.into_iter().next());
        Ok(ProviderTranslation {
            text: first.as_ref().map(|t| t.translated_text.clone()).unwrap_or_default(),
            detected_source_language: first.and_then(|t| t.detected_source_language),
        })
    }
}
