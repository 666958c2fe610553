/*!
 * Text extraction from uploaded files.
 *
 * Documents go through a `DocumentParser` chosen by container sub-type; a
 * parser failure (or panic) is replaced by a fixed placeholder so the rest of
 * the pipeline still runs. Audio goes through a `Transcriber`.
 */

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::ExtractionError;
use crate::file_utils::{DocumentFormat, FileManager, SourceKind};

/// Substituted when extraction yields only whitespace
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "No readable text was found in the uploaded file.";

/// Fixed sentence returned by the placeholder transcriber
pub const PLACEHOLDER_TRANSCRIPT: &str = "This is a placeholder transcription of the uploaded audio recording. \
Speech recognition is not enabled on this server, so the spoken content was not analysed.";

/// Placeholder used when a document parser fails
pub fn document_failure_placeholder(file_name: &str) -> String {
    format!(
        "Text could not be extracted from the document \"{}\". \
The file may be scanned, image-only, password-protected or damaged.",
        file_name
    )
}

// @const: Named and numeric character references
static XML_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-z]+);").unwrap());

// @const: DOCX body tokens (text runs, paragraph ends, tabs, breaks)
static DOCX_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab/>|<w:br/>").unwrap()
});

/// Text produced by one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Trimmed, never empty
    pub text: String,
    pub kind: SourceKind,
}

/// Format-specific text extraction primitive
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<String>;
}

/// UTF-8 text, lossy, BOM stripped
#[derive(Debug, Default)]
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// PDF text layer via `pdf-extract`
#[derive(Debug, Default)]
pub struct PdfParser;

impl DocumentParser for PdfParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| anyhow!("PDF parse error: {}", e))
    }
}

/// Office Open XML word-processing documents
#[derive(Debug, Default)]
pub struct DocxParser;

impl DocxParser {
    /// Pull the visible text out of `word/document.xml`
    pub fn text_from_document_xml(xml: &str) -> String {
        let mut text = String::new();
        for token in DOCX_TOKEN.captures_iter(xml) {
            match token.get(1) {
                Some(run) => text.push_str(&unescape_xml(run.as_str())),
                None => match token.get(0).map(|m| m.as_str()) {
                    Some("<w:tab/>") => text.push('\t'),
                    _ => text.push('\n'),
                },
            }
        }
        text
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Not a DOCX archive")?;
        let mut entry = archive
            .by_name("word/document.xml")
            .context("DOCX archive has no word/document.xml")?;

        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .context("Failed to read word/document.xml")?;

        Ok(Self::text_from_document_xml(&xml))
    }
}

fn unescape_xml(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Speech-to-text capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<String, ExtractionError>;
}

/// Stand-in recognizer: waits, then returns a fixed descriptive sentence
#[derive(Debug, Clone)]
pub struct PlaceholderTranscriber {
    delay: Duration,
}

impl PlaceholderTranscriber {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for PlaceholderTranscriber {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, ExtractionError> {
        debug!("Placeholder transcription for {:?}", audio.file_name().unwrap_or_default());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PLACEHOLDER_TRANSCRIPT.to_string())
    }
}

/// Runs an external recognizer as `<program> [args...] <audio path>` and
/// reads the transcript from stdout
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, ExtractionError> {
        let run = Command::new(&self.program)
            .args(&self.args)
            .arg(audio)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                ExtractionError::TranscriptionFailed(format!(
                    "{} timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ExtractionError::TranscriptionFailed(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::TranscriptionFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(ExtractionError::TranscriptionFailed(format!(
                "{} produced no transcript",
                self.program
            )));
        }

        Ok(transcript)
    }
}

/// Turns an upload into text according to its kind
#[derive(Clone)]
pub struct TextExtractor {
    transcriber: Arc<dyn Transcriber>,
    plain_text: Arc<dyn DocumentParser>,
    pdf: Arc<dyn DocumentParser>,
    word_processor: Arc<dyn DocumentParser>,
}

impl TextExtractor {
    /// Extractor with the built-in document parsers
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            transcriber,
            plain_text: Arc::new(PlainTextParser),
            pdf: Arc::new(PdfParser),
            word_processor: Arc::new(DocxParser),
        }
    }

    /// Replace the parser for one document sub-type
    pub fn with_parser(mut self, format: DocumentFormat, parser: Arc<dyn DocumentParser>) -> Self {
        match format {
            DocumentFormat::PlainText => self.plain_text = parser,
            DocumentFormat::Pdf => self.pdf = parser,
            DocumentFormat::WordProcessor => self.word_processor = parser,
        }
        self
    }

    fn parser_for(&self, format: DocumentFormat) -> Arc<dyn DocumentParser> {
        match format {
            DocumentFormat::PlainText => Arc::clone(&self.plain_text),
            DocumentFormat::Pdf => Arc::clone(&self.pdf),
            DocumentFormat::WordProcessor => Arc::clone(&self.word_processor),
        }
    }

    /// Extract text from the file at `path`
    ///
    /// The document sub-type comes from the path's extension. Only an
    /// unsupported sub-type or a failed transcription is an error; the
    /// returned text is trimmed and never empty.
    pub async fn extract(&self, path: &Path, kind: SourceKind) -> Result<ExtractionResult, ExtractionError> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.extract_named(path, kind, &display_name).await
    }

    /// Like `extract`, naming the document `display_name` in any placeholder
    /// text instead of the on-disk file name
    pub async fn extract_named(
        &self,
        path: &Path,
        kind: SourceKind,
        display_name: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let raw = match kind {
            SourceKind::Audio => self.transcriber.transcribe(path).await?,
            SourceKind::Document => self.extract_document(path, display_name).await?,
        };

        let trimmed = raw.trim();
        let text = if trimmed.is_empty() {
            warn!("Extraction produced no text for {}", display_name);
            EMPTY_CONTENT_PLACEHOLDER.to_string()
        } else {
            trimmed.to_string()
        };

        Ok(ExtractionResult { text, kind })
    }

    async fn extract_document(&self, path: &Path, display_name: &str) -> Result<String, ExtractionError> {
        let ext = FileManager::extension_of(path).unwrap_or_default();
        let format = DocumentFormat::from_extension(&ext)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(ext.clone()))?;

        let file_name = if display_name.trim().is_empty() {
            format!("document.{}", ext)
        } else {
            display_name.to_string()
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read document {}: {}", file_name, e);
                return Ok(document_failure_placeholder(&file_name));
            }
        };

        // Parsers are CPU-bound and some panic on malformed input
        let parser = self.parser_for(format);
        let parsed = tokio::task::spawn_blocking(move || parser.parse(&bytes)).await;

        match parsed {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                warn!("Document parser failed for {}: {:#}", file_name, e);
                Ok(document_failure_placeholder(&file_name))
            }
            Err(e) => {
                warn!("Document parser aborted for {}: {}", file_name, e);
                Ok(document_failure_placeholder(&file_name))
            }
        }
    }
}
