use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{ProviderTranslation, TranslationBackend, http_client, status_error, transport_error};

/// DeepL client for the `/v2/translate` endpoint
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as `auth_key`
    api_key: String,
    /// Base URL, e.g. `https://api-free.deepl.com`
    endpoint: String,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    #[serde(default)]
    pub translations: Vec<DeepLTranslation>,
}

/// One translated text in a DeepL response
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    pub text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

impl DeepL {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Build the form body; DeepL wants upper-case language codes
    pub fn form_fields(&self, text: &str, target: &str, source: Option<&str>) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("auth_key", self.api_key.clone()),
            ("text", text.to_string()),
            ("target_lang", language_utils::to_deepl_code(target)),
        ];
        if let Some(source) = source {
            fields.push(("source_lang", language_utils::to_deepl_code(source)));
        }
        fields
    }
}

#[async_trait]
impl TranslationBackend for DeepL {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn submit(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<ProviderTranslation, ProviderError> {
        let api_url = format!("{}/v2/translate", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .form(&self.form_fields(text, target, source))
            .send()
            .await
            .map_err(|e| transport_error("DeepL", e))?;

        if !response.status().is_success() {
            return Err(status_error("DeepL", response).await);
        }

        let body = response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("DeepL response: {}", e)))?;

        let first = body.translations.into_iter().next();
        Ok(ProviderTranslation {
            text: first.as_ref().map(|t| t.text.clone()).unwrap_or_default(),
            detected_source_language: first
                .and_then(|t| t.detected_source_language)
                .map(|code| code.to_lowercase()),
        })
    }
}
