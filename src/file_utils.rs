use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::PipelineError;

// @module: Upload classification and file utilities

// @const: Audio extensions accepted for upload
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac"];

// @const: Document extensions accepted for upload
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt"];

/// Coarse kind of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Time-based media; text comes from transcription
    Audio,
    /// Text-bearing container; text comes from a document parser
    Document,
}

impl SourceKind {
    /// Whether the source has a time base subtitles can hang off
    pub fn is_timed_media(&self) -> bool {
        matches!(self, Self::Audio)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Container sub-type of a document upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    /// `.docx`, and legacy `.doc` which goes through the same parser
    WordProcessor,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::WordProcessor),
            _ => None,
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @returns: Lowercase extension without the dot
    pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    // @checks: Extension against the upload allow-list
    pub fn classify_extension(ext: &str) -> Option<SourceKind> {
        let ext = ext.to_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Audio)
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Document)
        } else {
            None
        }
    }

    /// Classify an upload by its declared name, enforcing the allow-list and
    /// the size ceiling before any processing happens
    pub fn classify_upload(file_name: &str, size_bytes: u64, max_bytes: u64) -> Result<SourceKind, PipelineError> {
        let reject = |reason: String| PipelineError::RejectedFileType {
            file_name: file_name.to_string(),
            reason,
        };

        let ext = Self::extension_of(file_name)
            .ok_or_else(|| reject("file has no extension".to_string()))?;

        let kind = Self::classify_extension(&ext)
            .ok_or_else(|| reject(format!("extension .{} is not allowed", ext)))?;

        if size_bytes > max_bytes {
            return Err(reject(format!(
                "file is {} bytes, limit is {} bytes",
                size_bytes, max_bytes
            )));
        }

        Ok(kind)
    }

    // @returns: Content-type hint for an artifact extension
    pub fn content_type_for(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "txt" => "text/plain; charset=utf-8",
            "srt" => "application/x-subrip",
            "vtt" => "text/vtt",
            "pdf" => "application/pdf",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            _ => "application/octet-stream",
        }
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Output path for a downloaded artifact
    // @params: input_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let output_filename = format!(
            "{}.{}.{}",
            stem.to_string_lossy(),
            target_language,
            extension
        );

        output_dir.as_ref().join(output_filename)
    }

    /// Find every file under `dir` whose extension is on the upload allow-list
    pub fn find_uploadable_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && Self::extension_of(path)
                    .and_then(|ext| Self::classify_extension(&ext))
                    .is_some()
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Write bytes to a file, creating the parent directory
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
