/*!
 * Artifact formatting.
 *
 * Produces the bytes of a result artifact: a plain-text report, or a timed
 * subtitle track (SRT or WebVTT) built from unsegmented text. PDF and Word
 * outputs go through a pluggable `DocumentRenderer`; the default one emits
 * the plain report unchanged.
 */

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::FormatError;

// @const: Sentence terminators, runs collapsed
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Default cue window length in seconds
pub const DEFAULT_CUE_DURATION_SECS: f64 = 4.0;

/// Requested artifact container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Txt,
    Srt,
    Vtt,
    Pdf,
    Docx,
}

impl OutputKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Subtitle kinds need a time-based source
    pub fn is_timed_subtitle(&self) -> bool {
        matches!(self, Self::Srt | Self::Vtt)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(Self::Txt),
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "pdf" => Ok(Self::Pdf),
            "docx" | "word" => Ok(Self::Docx),
            _ => Err(FormatError::UnsupportedOutputKind(s.to_string())),
        }
    }
}

/// One timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// 1-based cue number
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub original: String,
    /// Empty when the translated side ran out of fragments
    pub translated: String,
}

/// Renders the report into a binary document container
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, report: &str, kind: OutputKind) -> Result<Vec<u8>, FormatError>;
}

/// Emits the plain-text report; only the declared kind and extension differ
#[derive(Debug, Default)]
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, report: &str, _kind: OutputKind) -> Result<Vec<u8>, FormatError> {
        Ok(report.as_bytes().to_vec())
    }
}

/// Format seconds as `HH:MM:SS,mmm`
///
/// Each field is floored independently from the fractional input, so
/// `4.0` gives `00:00:04,000` and `3661.5` gives `01:01:01,500`.
pub fn format_srt_time(seconds: f64) -> String {
    let (h, m, s, ms) = time_fields(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format seconds as `HH:MM:SS.mmm` for WebVTT
pub fn format_vtt_time(seconds: f64) -> String {
    let (h, m, s, ms) = time_fields(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

fn time_fields(seconds: f64) -> (u64, u64, u64, u64) {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).floor();
    let secs = (seconds % 60.0).floor();
    let millis = ((seconds % 1.0) * 1000.0).floor();
    (hours as u64, minutes as u64, secs as u64, millis as u64)
}

/// Split on sentence terminators, dropping empty fragments
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pair original and translated fragments by index into fixed-length cues
///
/// Pairing is positional: when the two sides have different fragment counts
/// the shorter side contributes empty lines. Slot `i` always occupies
/// `[i * cue_secs, (i + 1) * cue_secs)`; slots without an original fragment
/// produce no cue and do not consume a number.
pub fn build_cues(original: &str, translated: &str, cue_secs: f64) -> Vec<Cue> {
    let originals = split_sentences(original);
    let translations = split_sentences(translated);
    let slots = originals.len().max(translations.len());

    let mut cues = Vec::with_capacity(originals.len());
    let mut next_index = 1;
    for slot in 0..slots {
        let original = originals.get(slot).map(String::as_str).unwrap_or("");
        if original.trim().is_empty() {
            continue;
        }

        cues.push(Cue {
            index: next_index,
            start_secs: slot as f64 * cue_secs,
            end_secs: (slot + 1) as f64 * cue_secs,
            original: original.to_string(),
            translated: translations.get(slot).cloned().unwrap_or_default(),
        });
        next_index += 1;
    }

    cues
}

/// SubRip: numbered cues with a time-range line
pub fn render_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for cue in cues {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
            cue.original,
            cue.translated
        ));
    }
    out
}

/// WebVTT: `WEBVTT` preamble, unnumbered cues
pub fn render_vtt(cues: &[Cue]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for cue in cues {
        out.push_str(&format!(
            "{} --> {}\n{}\n{}\n\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
            cue.original,
            cue.translated
        ));
    }
    out
}

/// Plain human-readable report
pub fn render_report(
    original: &str,
    translated: &str,
    source_file_name: &str,
    generated_at: DateTime<Utc>,
) -> String {
    format!(
        "VOICELY TRANSLATION REPORT\n\
         ==========================\n\
         Source file: {}\n\
         Generated: {}\n\
         \n\
         --- ORIGINAL TEXT ---\n\
         {}\n\
         \n\
         --- TRANSLATED TEXT ---\n\
         {}\n",
        source_file_name,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        original,
        translated
    )
}

/// Produces artifact bytes for a requested output kind
#[derive(Clone)]
pub struct ArtifactFormatter {
    renderer: Arc<dyn DocumentRenderer>,
    cue_duration_secs: f64,
}

impl Default for ArtifactFormatter {
    fn default() -> Self {
        Self::new(Arc::new(PlainTextRenderer))
    }
}

impl ArtifactFormatter {
    pub fn new(renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            renderer,
            cue_duration_secs: DEFAULT_CUE_DURATION_SECS,
        }
    }

    pub fn with_cue_duration(mut self, secs: f64) -> Self {
        self.cue_duration_secs = secs;
        self
    }

    /// Reject subtitle output for sources without a time base
    pub fn check_applicable(kind: OutputKind, is_timed_media: bool) -> Result<(), FormatError> {
        if kind.is_timed_subtitle() && !is_timed_media {
            return Err(FormatError::FormatNotApplicable(kind.to_string()));
        }
        Ok(())
    }

    /// Format with the current time as the report timestamp
    pub fn format(
        &self,
        original: &str,
        translated: &str,
        source_file_name: &str,
        kind: OutputKind,
        is_timed_media: bool,
    ) -> Result<Vec<u8>, FormatError> {
        self.format_at(original, translated, source_file_name, kind, is_timed_media, Utc::now())
    }

    pub fn format_at(
        &self,
        original: &str,
        translated: &str,
        source_file_name: &str,
        kind: OutputKind,
        is_timed_media: bool,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, FormatError> {
        Self::check_applicable(kind, is_timed_media)?;

        match kind {
            OutputKind::Txt => {
                Ok(render_report(original, translated, source_file_name, generated_at).into_bytes())
            }
            OutputKind::Pdf | OutputKind::Docx => {
                let report = render_report(original, translated, source_file_name, generated_at);
                self.renderer.render(&report, kind)
            }
            OutputKind::Srt => {
                Ok(render_srt(&build_cues(original, translated, self.cue_duration_secs)).into_bytes())
            }
            OutputKind::Vtt => {
                Ok(render_vtt(&build_cues(original, translated, self.cue_duration_secs)).into_bytes())
            }
        }
    }

    /// Same as `format`, parsing the output kind from its name first
    pub fn format_named(
        &self,
        original: &str,
        translated: &str,
        source_file_name: &str,
        kind: &str,
        is_timed_media: bool,
    ) -> Result<Vec<u8>, FormatError> {
        let kind = OutputKind::from_str(kind)?;
        self.format(original, translated, source_file_name, kind, is_timed_media)
    }
}
