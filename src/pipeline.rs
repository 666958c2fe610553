/*!
 * File-to-translated-artifact pipeline.
 *
 * One run moves through `Received → Extracting → Translating → Formatting →
 * Persisted`, or stops in `Failed`. The staged upload is released as soon as
 * extraction finishes, whatever its outcome, so no input bytes outlive the
 * run. Runs share nothing mutable except the artifact store.
 */

use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempPath;

use crate::app_config::Config;
use crate::artifact_store::{Artifact, ArtifactId, ArtifactStore, FsArtifactStore, RetrievedArtifact};
use crate::errors::{ConfigError, PipelineError, TranslationError};
use crate::extraction::{CommandTranscriber, PlaceholderTranscriber, TextExtractor, Transcriber};
use crate::file_utils::{FileManager, SourceKind};
use crate::formatter::{ArtifactFormatter, OutputKind};
use crate::translation::{TranslationGateway, TranslationRequest, TranslationResult, truncate_preview};

/// Stages of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Extracting,
    Translating,
    Formatting,
    Persisted,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a caller submits
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub file_name: String,
    pub bytes: Bytes,
    pub target_language_code: String,
    /// Output kind by name (`txt`, `srt`, `vtt`, `pdf`, `docx`)
    pub output_kind: String,
}

impl PipelineRequest {
    pub fn new(
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        target_language_code: impl Into<String>,
        output_kind: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            target_language_code: target_language_code.into(),
            output_kind: output_kind.into(),
        }
    }
}

/// Descriptor returned by a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub artifact_id: ArtifactId,
    pub truncated_original_text: String,
    pub truncated_translated_text: String,
    pub source_file_name: String,
    pub source_kind: SourceKind,
    pub target_language_code: String,
    pub output_kind: OutputKind,
    pub completed_at: DateTime<Utc>,
    /// Provider that served the translation; `None` when translation was skipped
    pub provider_used: Option<String>,
}

impl PipelineOutcome {
    /// Extension to pass back when retrieving the artifact
    pub fn artifact_extension(&self) -> &'static str {
        self.output_kind.extension()
    }
}

/// Upload bytes staged on disk for the duration of one run
#[derive(Debug)]
pub struct UploadedFile {
    file_name: String,
    kind: SourceKind,
    path: Option<TempPath>,
}

impl UploadedFile {
    /// Write `bytes` to a temp file that keeps the original extension
    pub async fn stage(dir: &Path, file_name: &str, kind: SourceKind, bytes: Bytes) -> std::io::Result<Self> {
        let suffix = FileManager::extension_of(file_name)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let dir = dir.to_path_buf();

        let path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(std::io::Error::other)??;

        Ok(Self {
            file_name: file_name.to_string(),
            kind,
            path: Some(path),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the staged bytes; a failure is logged, never escalated
    pub fn release(mut self) {
        if let Some(path) = self.path.take() {
            let display = path.display().to_string();
            match path.close() {
                Ok(()) => debug!("Released upload {}", display),
                Err(e) => warn!("Failed to release upload {}: {}", display, e),
            }
        }
    }
}

/// Composes extraction, translation, formatting and persistence
#[derive(Clone)]
pub struct PipelineOrchestrator {
    extractor: TextExtractor,
    gateway: TranslationGateway,
    formatter: ArtifactFormatter,
    store: Arc<dyn ArtifactStore>,
    staging_dir: PathBuf,
    max_upload_bytes: u64,
    preview_units: usize,
}

impl PipelineOrchestrator {
    pub fn new(
        extractor: TextExtractor,
        gateway: TranslationGateway,
        formatter: ArtifactFormatter,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            extractor,
            gateway,
            formatter,
            store,
            staging_dir: std::env::temp_dir().join("voicely-uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            preview_units: 500,
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_preview_units(mut self, units: usize) -> Self {
        self.preview_units = units;
        self
    }

    /// Wire up the HTTP providers, filesystem store and configured transcriber
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let transcriber: Arc<dyn Transcriber> = match &config.transcription.command {
            Some(command) if !command.trim().is_empty() => Arc::new(CommandTranscriber::new(
                command.trim(),
                config.transcription.args.clone(),
                Duration::from_secs(config.transcription.timeout_secs),
            )),
            _ => Arc::new(PlaceholderTranscriber::new(Duration::from_millis(
                config.transcription.placeholder_delay_ms,
            ))),
        };

        let staging_dir = config
            .pipeline
            .staging_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("voicely-uploads"));

        Ok(Self::new(
            TextExtractor::new(transcriber),
            TranslationGateway::from_config(&config.translation)?,
            ArtifactFormatter::default().with_cue_duration(config.pipeline.cue_duration_secs),
            Arc::new(FsArtifactStore::new(config.pipeline.artifact_dir.clone())),
        )
        .with_staging_dir(staging_dir)
        .with_max_upload_bytes(config.pipeline.max_upload_bytes)
        .with_preview_units(config.pipeline.preview_units))
    }

    /// Run the pipeline for one upload
    pub async fn submit(&self, request: PipelineRequest) -> Result<PipelineOutcome, PipelineError> {
        let file_name = request.file_name.clone();
        let mut stage = PipelineStage::Received;

        let result = self.run(request, &mut stage).await;
        match &result {
            Ok(outcome) => info!(
                "Processed {} -> artifact {}.{}",
                file_name,
                outcome.artifact_id,
                outcome.artifact_extension()
            ),
            Err(e) => warn!("Run for {} failed during {}: {}", file_name, stage, e),
        }
        result
    }

    async fn run(&self, request: PipelineRequest, stage: &mut PipelineStage) -> Result<PipelineOutcome, PipelineError> {
        let PipelineRequest {
            file_name,
            bytes,
            target_language_code,
            output_kind,
        } = request;

        // Everything that can be refused up front is refused before staging
        let source_kind = FileManager::classify_upload(&file_name, bytes.len() as u64, self.max_upload_bytes)?;
        let output_kind = OutputKind::from_str(&output_kind)?;
        ArtifactFormatter::check_applicable(output_kind, source_kind.is_timed_media())?;

        let upload = UploadedFile::stage(&self.staging_dir, &file_name, source_kind, bytes)
            .await
            .map_err(|e| PipelineError::PersistenceFailed(format!("Failed to stage upload: {}", e)))?;

        *stage = PipelineStage::Extracting;
        debug!("{}: {} -> {}", file_name, PipelineStage::Received, stage);
        let extraction = self
            .extractor
            .extract_named(upload.path(), source_kind, upload.file_name())
            .await;
        upload.release();
        let extraction = extraction?;
        let original_text = extraction.text;

        *stage = PipelineStage::Translating;
        let (translated_text, provider_used) = if original_text.trim().is_empty() {
            debug!("{}: nothing to translate, skipping", file_name);
            (String::new(), None)
        } else {
            let translation_request = TranslationRequest::new(original_text.clone(), target_language_code.clone());
            match self.gateway.translate(&translation_request).await {
                Ok(result) => (result.translated_text, Some(result.provider_used)),
                Err(source) => {
                    return Err(PipelineError::TranslationFailed {
                        original_text,
                        source,
                    });
                }
            }
        };

        *stage = PipelineStage::Formatting;
        let formatted = self.formatter.format(
            &original_text,
            &translated_text,
            &file_name,
            output_kind,
            source_kind.is_timed_media(),
        )?;

        let artifact = Artifact::new(output_kind, formatted);
        self.store.put(&artifact).await.map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?;
        *stage = PipelineStage::Persisted;

        Ok(PipelineOutcome {
            artifact_id: artifact.meta.id,
            truncated_original_text: truncate_preview(&original_text, self.preview_units),
            truncated_translated_text: truncate_preview(&translated_text, self.preview_units),
            source_file_name: file_name,
            source_kind,
            target_language_code,
            output_kind,
            completed_at: Utc::now(),
            provider_used,
        })
    }

    /// Read back an artifact produced by an earlier run
    pub async fn retrieve(&self, artifact_id: &str, extension: &str) -> Result<RetrievedArtifact, PipelineError> {
        self.store.get(artifact_id, extension).await.map_err(PipelineError::from)
    }

    /// Translate text directly, outside a file run
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, TranslationError> {
        self.gateway.translate(request).await
    }
}
