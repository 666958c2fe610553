/*!
 * # Voicely - document and voice translation pipeline
 *
 * A Rust library that turns an uploaded document or audio recording into a
 * translated, downloadable artifact.
 *
 * ## Features
 *
 * - Text extraction from plain text, PDF and Word documents
 * - Transcription of audio uploads behind a swappable recognizer
 * - Translation through an ordered provider chain with fallback:
 *   - DeepL API
 *   - Google Cloud Translation
 *   - LibreTranslate
 * - Plain-text reports and time-aligned SRT / WebVTT subtitle tracks
 * - Write-once artifact storage, retrievable by id
 * - Google text-to-speech synthesis
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `extraction`: Document parsers and transcribers
 * - `translation`: Requests, results and the provider-fallback gateway
 * - `formatter`: Report and subtitle generation
 * - `artifact_store`: Artifact persistence and retrieval
 * - `pipeline`: The orchestrator composing all of the above
 * - `speech`: Text-to-speech requests
 * - `file_utils`: Upload classification and file system operations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for the translation and speech APIs:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::google`: Google Cloud Translation client
 *   - `providers::libre`: LibreTranslate client
 *   - `providers::google_tts`: Google text-to-speech client
 *   - `providers::mock`: Scriptable in-process provider
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod artifact_store;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod formatter;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod speech;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use artifact_store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
pub use errors::{AppError, ErrorPayload, PipelineError, ProviderError, TranslationError};
pub use formatter::{ArtifactFormatter, OutputKind};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use pipeline::{PipelineOrchestrator, PipelineOutcome, PipelineRequest};
pub use translation::{TranslationGateway, TranslationRequest, TranslationResult};
