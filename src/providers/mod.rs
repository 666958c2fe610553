/*!
 * Provider implementations for the translation and speech services.
 *
 * This module contains client implementations for:
 * - DeepL: DeepL API (form-encoded)
 * - Google: Cloud Translation v2 (JSON)
 * - Libre: LibreTranslate, public or self-hosted
 * - Mock: in-process fake used by tests
 * - Google TTS: text-to-speech synthesis
 */

use async_trait::async_trait;
use log::error;
use reqwest::{Client, Response, StatusCode};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ProviderConfig, TranslationProvider};
use crate::errors::ProviderError;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = "Voicely/1.0";

/// Text returned by one successful provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTranslation {
    /// The translated text
    pub text: String,
    /// Source language as detected by the provider, when reported
    pub detected_source_language: Option<String>,
}

/// Capability shared by every translation backend
///
/// Backends are held as trait objects in an ordered chain, so the gateway can
/// swap, reorder or fake them without knowing their wire formats.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Identifier used for pinning and reported as `providerUsed`
    fn name(&self) -> &str;

    /// Submit one translation request
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `target` - Target language code
    /// * `source` - Source language code, or `None` for auto-detection
    async fn submit(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<ProviderTranslation, ProviderError>;
}

/// Build the HTTP backend for a configuration entry
pub fn build_backend(config: &ProviderConfig) -> Arc<dyn TranslationBackend> {
    let endpoint = config.effective_endpoint();
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.provider_type {
        TranslationProvider::DeepL => Arc::new(deepl::DeepL::new(&config.api_key, endpoint, timeout)),
        TranslationProvider::Google => Arc::new(google::Google::new(&config.api_key, endpoint, timeout)),
        TranslationProvider::Libre => Arc::new(libre::Libre::new(&config.api_key, endpoint, timeout)),
    }
}

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

/// Map a transport-level failure
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::ConnectionError(format!("{} request timed out: {}", provider, err))
    } else if err.is_connect() {
        ProviderError::ConnectionError(format!("Failed to connect to {}: {}", provider, err))
    } else {
        ProviderError::RequestFailed(format!("Failed to send request to {}: {}", provider, err))
    }
}

/// Turn a non-2xx response into the matching provider error
pub(crate) async fn status_error(provider: &str, response: Response) -> ProviderError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());

    error!("{} API error ({}): {}", provider, status, body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationError(format!("{} rejected the credentials: {}", provider, body))
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

pub mod deepl;
pub mod google;
pub mod google_tts;
pub mod libre;
pub mod mock;
