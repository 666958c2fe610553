/*!
 * Common test utilities for the voicely test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use voicely::artifact_store::MemoryArtifactStore;
use voicely::extraction::{PlaceholderTranscriber, TextExtractor};
use voicely::formatter::ArtifactFormatter;
use voicely::pipeline::PipelineOrchestrator;
use voicely::providers::TranslationBackend;
use voicely::providers::mock::MockProvider;
use voicely::translation::TranslationGateway;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    std::fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Minimal DOCX archive whose body holds one paragraph per entry
pub fn build_docx(paragraphs: &[&str]) -> Result<Vec<u8>> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
        body
    );

    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>")?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(document.as_bytes())?;
        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

/// Minimal one-page PDF whose text layer shows `text` in Helvetica
pub fn build_pdf(text: &str) -> Vec<u8> {
    let escaped = text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
    let stream = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", escaped);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
/Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Response generator rendering the greeting in Turkish, so tests can find
/// the translated counterpart in an artifact
pub fn turkish_response(text: &str, _target: &str) -> String {
    text.replace("Hello world", "Merhaba dünya")
}

/// Pieces of a test pipeline that tests want to inspect afterwards
pub struct TestPipeline {
    pub orchestrator: PipelineOrchestrator,
    pub store: Arc<MemoryArtifactStore>,
    pub staging: TempDir,
}

/// Pipeline over the given mock chain, an in-memory store, no transcription
/// latency and a private staging directory
pub fn create_test_pipeline(chain: Vec<MockProvider>) -> Result<TestPipeline> {
    let backends: Vec<Arc<dyn TranslationBackend>> = chain
        .into_iter()
        .map(|p| Arc::new(p) as Arc<dyn TranslationBackend>)
        .collect();

    let store = Arc::new(MemoryArtifactStore::new());
    let staging = create_temp_dir()?;

    let orchestrator = PipelineOrchestrator::new(
        TextExtractor::new(Arc::new(PlaceholderTranscriber::new(Duration::ZERO))),
        TranslationGateway::new(backends).with_call_timeout(Duration::from_secs(2)),
        ArtifactFormatter::default(),
        store.clone(),
    )
    .with_staging_dir(staging.path());

    Ok(TestPipeline {
        orchestrator,
        store,
        staging,
    })
}

/// Number of entries left in a directory
pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
