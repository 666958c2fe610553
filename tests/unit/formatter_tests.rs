/*!
 * Tests for report and subtitle formatting
 */

use chrono::{TimeZone, Utc};
use regex::Regex;
use std::str::FromStr;
use std::sync::Arc;

use voicely::errors::FormatError;
use voicely::formatter::{
    ArtifactFormatter, DocumentRenderer, OutputKind, build_cues, format_srt_time, format_vtt_time, render_srt,
    render_vtt,
};

#[test]
fn test_formatSrtTime_shouldMatchReferenceValues() {
    assert_eq!(format_srt_time(4.0), "00:00:04,000");
    assert_eq!(format_srt_time(3661.5), "01:01:01,500");
    assert_eq!(format_srt_time(0.0), "00:00:00,000");
    assert_eq!(format_srt_time(59.75), "00:00:59,750");
}

#[test]
fn test_formatVttTime_shouldUseDotSeparator() {
    assert_eq!(format_vtt_time(8.0), "00:00:08.000");
    assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
}

#[test]
fn test_buildCues_withMoreOriginalFragments_shouldLeaveTranslationEmpty() {
    let cues = build_cues("One. Two! Three?", "Bir. Iki.", 4.0);

    assert_eq!(cues.len(), 3);
    assert_eq!(cues.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(cues[0].original, "One");
    assert_eq!(cues[0].translated, "Bir");
    assert_eq!(cues[2].original, "Three");
    assert_eq!(cues[2].translated, "");
    assert_eq!(cues[2].start_secs, 8.0);
    assert_eq!(cues[2].end_secs, 12.0);
}

#[test]
fn test_buildCues_withMoreTranslatedFragments_shouldNotNumberExtraSlots() {
    let cues = build_cues("Only one.", "Bir. Iki. Uc.", 4.0);
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].index, 1);
    assert_eq!(cues[0].translated, "Bir");
}

#[test]
fn test_buildCues_withNoTerminators_shouldProduceOneCue() {
    let cues = build_cues("no punctuation here", "", 4.0);
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].original, "no punctuation here");
    assert_eq!(cues[0].translated, "");
}

#[test]
fn test_renderSrt_shouldEmitNumberTimeRangeAndBothLines() {
    let srt = render_srt(&build_cues("Hello. Bye.", "Merhaba. Hoscakal.", 4.0));
    let expected = "1\n00:00:00,000 --> 00:00:04,000\nHello\nMerhaba\n\n\
2\n00:00:04,000 --> 00:00:08,000\nBye\nHoscakal\n\n";
    assert_eq!(srt, expected);
}

#[test]
fn test_renderVtt_shouldStartWithPreambleAndOmitNumbers() {
    let vtt = render_vtt(&build_cues("Hello.", "Merhaba.", 4.0));
    assert_eq!(vtt, "WEBVTT\n\n00:00:00.000 --> 00:00:04.000\nHello\nMerhaba\n\n");
}

#[test]
fn test_format_withTimedOutputForDocument_shouldFailNotApplicable() {
    let formatter = ArtifactFormatter::default();
    for kind in [OutputKind::Srt, OutputKind::Vtt] {
        let error = formatter.format("A.", "B.", "doc.pdf", kind, false).unwrap_err();
        assert!(matches!(error, FormatError::FormatNotApplicable(_)));
    }
}

#[test]
fn test_format_withUnknownKind_shouldFailUnsupported() {
    let formatter = ArtifactFormatter::default();
    let error = formatter.format_named("A.", "B.", "a.txt", "mp4", false).unwrap_err();
    assert!(matches!(error, FormatError::UnsupportedOutputKind(ref k) if k == "mp4"));
}

#[test]
fn test_format_txtReport_shouldEmbedEverything() {
    let formatter = ArtifactFormatter::default();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let bytes = formatter
        .format_at("Hello world.", "Merhaba dünya.", "greeting.txt", OutputKind::Txt, false, at)
        .unwrap();
    let report = String::from_utf8(bytes).unwrap();

    assert!(report.starts_with("VOICELY TRANSLATION REPORT"));
    assert!(report.contains("Source file: greeting.txt"));
    assert!(report.contains("Generated: 2024-05-01 12:30:00 UTC"));
    assert!(report.contains("--- ORIGINAL TEXT ---\nHello world."));
    assert!(report.contains("--- TRANSLATED TEXT ---\nMerhaba dünya."));
}

#[test]
fn test_format_pdfAndDocx_shouldCarryPlainReport() {
    let formatter = ArtifactFormatter::default();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let txt = formatter.format_at("A.", "B.", "a.txt", OutputKind::Txt, false, at).unwrap();
    let pdf = formatter.format_at("A.", "B.", "a.txt", OutputKind::Pdf, false, at).unwrap();
    let docx = formatter.format_at("A.", "B.", "a.txt", OutputKind::Docx, true, at).unwrap();
    assert_eq!(txt, pdf);
    assert_eq!(txt, docx);
}

struct TaggingRenderer;

impl DocumentRenderer for TaggingRenderer {
    fn render(&self, report: &str, kind: OutputKind) -> Result<Vec<u8>, FormatError> {
        Ok(format!("[{}]{}", kind, report.len()).into_bytes())
    }
}

#[test]
fn test_format_withCustomRenderer_shouldOnlyAffectDocumentKinds() {
    let formatter = ArtifactFormatter::new(Arc::new(TaggingRenderer));
    let pdf = formatter.format("A.", "B.", "a.txt", OutputKind::Pdf, false).unwrap();
    assert!(String::from_utf8(pdf).unwrap().starts_with("[pdf]"));

    let txt = formatter.format("A.", "B.", "a.txt", OutputKind::Txt, false).unwrap();
    assert!(String::from_utf8(txt).unwrap().starts_with("VOICELY"));
}

#[test]
fn test_format_srtForAudio_shouldMatchCueShape() {
    let formatter = ArtifactFormatter::default();
    let bytes = formatter.format("First. Second.", "Birinci. Ikinci.", "a.wav", OutputKind::Srt, true).unwrap();
    let srt = String::from_utf8(bytes).unwrap();

    let mut lines = srt.lines();
    assert_eq!(lines.next(), Some("1"));
    let range = Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}$").unwrap();
    assert!(range.is_match(lines.next().unwrap()));
}

#[test]
fn test_formatter_withCustomCueDuration_shouldStretchWindows() {
    let formatter = ArtifactFormatter::default().with_cue_duration(2.5);
    let bytes = formatter.format("A. B.", "C. D.", "a.wav", OutputKind::Srt, true).unwrap();
    let srt = String::from_utf8(bytes).unwrap();
    assert!(srt.contains("00:00:02,500 --> 00:00:05,000"));
}

#[test]
fn test_outputKind_fromStr_shouldAcceptAliases() {
    assert_eq!(OutputKind::from_str("TXT").unwrap(), OutputKind::Txt);
    assert_eq!(OutputKind::from_str(".srt").unwrap(), OutputKind::Srt);
    assert_eq!(OutputKind::from_str("webvtt").unwrap(), OutputKind::Vtt);
    assert_eq!(OutputKind::from_str("word").unwrap(), OutputKind::Docx);
    assert!(OutputKind::from_str("html").is_err());
    assert!(OutputKind::Srt.is_timed_subtitle());
    assert!(!OutputKind::Pdf.is_timed_subtitle());
}
