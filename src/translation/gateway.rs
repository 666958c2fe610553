/*!
 * Translation gateway.
 *
 * Holds the providers as an ordered chain of `TranslationBackend` trait
 * objects and tries them in turn, short-circuiting on the first success.
 * Failures along the way are logged and swallowed; only exhaustion of the
 * whole chain is reported. A pinned provider is tried alone and its failure
 * propagates as is.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::{ConfigError, ProviderError, TranslationError};
use crate::providers::{self, ProviderTranslation, TranslationBackend};
use super::{TranslationRequest, TranslationResult, utf16_len};

/// Default bound on a single provider call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on submitted text, in UTF-16 code units
pub const DEFAULT_MAX_TEXT_UNITS: usize = 5000;

/// Ordered provider chain with fallback
#[derive(Debug, Clone)]
pub struct TranslationGateway {
    chain: Vec<Arc<dyn TranslationBackend>>,
    call_timeout: Duration,
    max_text_units: usize,
}

impl TranslationGateway {
    /// Create a gateway over `chain`, tried front to back
    pub fn new(chain: Vec<Arc<dyn TranslationBackend>>) -> Self {
        Self {
            chain,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_text_units: DEFAULT_MAX_TEXT_UNITS,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_text_units(mut self, max_text_units: usize) -> Self {
        self.max_text_units = max_text_units;
        self
    }

    /// Build the HTTP chain described by the configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ConfigError> {
        let configs = config.chain_configs()?;
        if configs.is_empty() {
            return Err(ConfigError::EmptyProviderChain);
        }

        // The per-call bound is the longest configured provider timeout
        let timeout_secs = configs.iter().map(|c| c.timeout_secs).max().unwrap_or(10);
        let chain = configs.into_iter().map(providers::build_backend).collect();

        Ok(Self::new(chain)
            .with_call_timeout(Duration::from_secs(timeout_secs))
            .with_max_text_units(config.max_text_units))
    }

    /// Provider names in chain order
    pub fn provider_names(&self) -> Vec<String> {
        self.chain.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn max_text_units(&self) -> usize {
        self.max_text_units
    }

    /// Translate `request`, falling back along the chain unless a provider is pinned
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, TranslationError> {
        let text = request.source_text.as_str();
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let length = utf16_len(text);
        if length > self.max_text_units {
            return Err(TranslationError::InputTooLong {
                length,
                limit: self.max_text_units,
            });
        }

        if let Some(pinned) = request.provider.as_deref() {
            return self.translate_pinned(pinned, request).await;
        }

        let mut failures = Vec::with_capacity(self.chain.len());
        for backend in &self.chain {
            match self.call(backend.as_ref(), request).await {
                Ok(translation) => {
                    debug!("Translation served by {}", backend.name());
                    return Ok(Self::into_result(backend.name(), translation, request));
                }
                Err(e) => {
                    warn!("{} failed, trying next provider: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        Err(TranslationError::AllProvidersUnavailable { failures })
    }

    async fn translate_pinned(
        &self,
        pinned: &str,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let backend = self
            .chain
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(pinned.trim()))
            .ok_or_else(|| TranslationError::UnknownProvider(pinned.to_string()))?;

        self.call(backend.as_ref(), request)
            .await
            .map(|translation| Self::into_result(backend.name(), translation, request))
            .map_err(|source| TranslationError::Provider {
                provider: backend.name().to_string(),
                source,
            })
    }

    async fn call(
        &self,
        backend: &dyn TranslationBackend,
        request: &TranslationRequest,
    ) -> Result<ProviderTranslation, ProviderError> {
        let submission = backend.submit(
            &request.source_text,
            &request.target_language_code,
            request.source_language_code.as_deref(),
        );

        match tokio::time::timeout(self.call_timeout, submission).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.call_timeout.as_millis() as u64)),
        }
    }

    fn into_result(
        provider: &str,
        translation: ProviderTranslation,
        request: &TranslationRequest,
    ) -> TranslationResult {
        TranslationResult {
            translated_text: translation.text,
            provider_used: provider.to_string(),
            detected_source_language: translation
                .detected_source_language
                .or_else(|| request.source_language_code.clone()),
        }
    }
}
