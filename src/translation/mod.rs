/*!
 * Translation with provider fallback.
 *
 * - `gateway`: the ordered provider chain, pinning, caps and timeouts
 *
 * Lengths are counted in UTF-16 code units so the caps match what browser
 * and mobile clients measure on their side.
 */

use serde::{Deserialize, Serialize};

pub mod gateway;

pub use gateway::TranslationGateway;

/// One translation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub source_text: String,
    pub target_language_code: String,
    #[serde(default)]
    pub source_language_code: Option<String>,
    /// Pin a provider by name; disables fallback
    #[serde(default)]
    pub provider: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_text: text.into(),
            target_language_code: target.into(),
            source_language_code: None,
            provider: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_language_code = Some(source.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Result of a successful translation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    /// Name of the provider that returned the successful response
    pub provider_used: String,
    pub detected_source_language: Option<String>,
}

/// Length in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cap `text` at `max_units` UTF-16 code units, appending `...` when cut.
/// Never splits a character.
pub fn truncate_preview(text: &str, max_units: usize) -> String {
    if utf16_len(text) <= max_units {
        return text.to_string();
    }

    let mut units = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            break;
        }
        end = idx + ch.len_utf8();
    }

    format!("{}...", &text[..end])
}
