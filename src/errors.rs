/*!
 * Error types for the voicely pipeline.
 *
 * Each stage owns a `thiserror` enum; `PipelineError` is the terminal error a
 * pipeline run reports, and `ErrorPayload` is the `{kind, message}` shape handed
 * across the boundary to whatever transport sits in front of the library.
 */

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when talking to a translation or speech provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when building or sending the request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within the per-provider bound
    #[error("Provider timed out after {0} ms")]
    Timeout(u64),
}

/// Errors raised while turning an upload into text
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document container sub-type has no extractor
    #[error("Unsupported document format: .{0}")]
    UnsupportedFormat(String),

    /// Speech recognition failed and no safe fallback text exists
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Errors raised by the translation gateway
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Text exceeds the per-request cap; raised before any network call
    #[error("Text too long: {length} units (max {limit})")]
    InputTooLong { length: usize, limit: usize },

    /// Text is empty after trimming
    #[error("Text is required and must not be empty")]
    EmptyInput,

    /// Every provider in the chain failed
    #[error("All translation services are currently unavailable ({})", .failures.join("; "))]
    AllProvidersUnavailable { failures: Vec<String> },

    /// A pinned provider failed; no fallback was attempted
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// A pinned provider name is not part of the configured chain
    #[error("Provider '{0}' is not configured")]
    UnknownProvider(String),
}

/// Errors raised while formatting an artifact
#[derive(Error, Debug)]
pub enum FormatError {
    /// Subtitle output requested for a source without a time base
    #[error("Output kind '{0}' requires time-based media (audio) as the source")]
    FormatNotApplicable(String),

    /// Output kind is not one of the known kinds
    #[error("Unsupported output kind: {0}")]
    UnsupportedOutputKind(String),

    /// A document renderer failed to produce bytes
    #[error("Rendering failed: {0}")]
    RenderFailed(String),
}

/// Errors raised by the artifact store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    #[error("Artifact storage I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Terminal error of one pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Extension not on the allow-list, or the upload is over the size ceiling
    #[error("Rejected file '{file_name}': {reason}")]
    RejectedFileType { file_name: String, reason: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Translation failed; the extracted text is kept for diagnostics
    #[error("Translation failed: {source}")]
    TranslationFailed {
        original_text: String,
        #[source]
        source: TranslationError,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    /// Staging the upload or writing the artifact failed
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors raised while loading or validating configuration at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Translation provider chain is empty")]
    EmptyProviderChain,

    #[error("Provider '{0}' is in the chain but has no configuration entry")]
    MissingProviderConfig(String),

    #[error("API key is required for provider '{0}'")]
    MissingApiKey(String),

    #[error("Invalid endpoint for '{name}': {endpoint}")]
    InvalidEndpoint { name: String, endpoint: String },

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Main application error type used by the binary
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl TranslationError {
    /// Stable taxonomy name for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputTooLong { .. } => "InputTooLong",
            Self::EmptyInput => "InvalidInput",
            Self::AllProvidersUnavailable { .. } => "AllProvidersUnavailable",
            Self::Provider { .. } | Self::UnknownProvider(_) => "ProviderError",
        }
    }
}

impl FormatError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FormatNotApplicable(_) => "FormatNotApplicable",
            Self::UnsupportedOutputKind(_) => "UnsupportedOutputKind",
            Self::RenderFailed(_) => "PersistenceFailed",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::AlreadyExists(_) | Self::Io(_) => "PersistenceFailed",
        }
    }
}

impl PipelineError {
    /// Stable taxonomy name for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RejectedFileType { .. } => "RejectedFileType",
            Self::Extraction(ExtractionError::UnsupportedFormat(_)) => "UnsupportedFormat",
            Self::Extraction(ExtractionError::TranscriptionFailed(_)) => "TranscriptionFailed",
            Self::TranslationFailed { .. } => "TranslationFailed",
            Self::Format(e) => e.kind(),
            Self::PersistenceFailed(_) => "PersistenceFailed",
            Self::NotFound(_) => "NotFound",
        }
    }

    /// Extracted text preserved by a translation failure, if any
    pub fn original_text(&self) -> Option<&str> {
        match self {
            Self::TranslationFailed { original_text, .. } => Some(original_text),
            _ => None,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::PersistenceFailed(other.to_string()),
        }
    }
}

/// Structured `{kind, message}` error handed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

impl From<&PipelineError> for ErrorPayload {
    fn from(error: &PipelineError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&TranslationError> for ErrorPayload {
    fn from(error: &TranslationError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&StoreError> for ErrorPayload {
    fn from(error: &StoreError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}
