/*!
 * Mock translation backend for testing.
 *
 * This module provides a fake backend that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged text
 * - `MockProvider::failing()` - Always fails with a connection error
 * - `MockProvider::slow()` - Sleeps before answering, for timeout tests
 * - `MockProvider::intermittent()` - Fails every Nth request
 *
 * Clones share the call counter, so a test can keep a handle on a provider
 * it has moved into a gateway.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ProviderTranslation, TranslationBackend};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock provider for testing gateway and pipeline behavior
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    custom_response: Option<fn(&str, &str) -> String>,
    detected_language: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            detected_language: None,
        }
    }

    pub fn working(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Working)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Failing)
    }

    pub fn slow(name: impl Into<String>, delay_ms: u64) -> Self {
        Self::new(name, MockBehavior::Slow { delay_ms })
    }

    pub fn intermittent(name: impl Into<String>, fail_every: usize) -> Self {
        Self::new(name, MockBehavior::Intermittent { fail_every })
    }

    /// Set a custom response generator taking `(text, target)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Report this language as detected on success
    pub fn with_detected_language(mut self, code: impl Into<String>) -> Self {
        self.detected_language = Some(code.into());
        self
    }

    /// Number of requests received so far, across clones
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn respond(&self, text: &str, target: &str) -> ProviderTranslation {
        let text = match self.custom_response {
            Some(generator) => generator(text, target),
            None => format!("[{}] {}", target, text),
        };
        ProviderTranslation {
            text,
            detected_source_language: self.detected_language.clone(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            detected_language: self.detected_language.clone(),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(
        &self,
        text: &str,
        target: &str,
        _source: Option<&str>,
    ) -> Result<ProviderTranslation, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(text, target)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request {})", count + 1),
                    })
                } else {
                    Ok(self.respond(text, target))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(format!(
                "Simulated failure from {}",
                self.name
            ))),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(text, target))
            }
        }
    }
}
