use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Target and source codes arrive in whatever shape the caller typed them
/// (`tr`, `TR`, `en-US`, `fre`). These helpers validate the primary subtag
/// against ISO 639 and reshape codes for each provider's wire format.

// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a code like `en-US` or `pt_BR` into its primary subtag and region
pub fn split_region(code: &str) -> (String, Option<String>) {
    let trimmed = code.trim();
    match trimmed.split_once(['-', '_']) {
        Some((primary, region)) if !region.is_empty() => {
            (primary.to_lowercase(), Some(region.to_uppercase()))
        }
        _ => (trimmed.to_lowercase(), None),
    }
}

fn lookup(primary: &str) -> Option<Language> {
    match primary.len() {
        2 => Language::from_639_1(primary),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == primary)
                .map(|(_, t)| *t)
                .unwrap_or(primary);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate a language code; only the primary subtag is checked
pub fn validate_language_code(code: &str) -> Result<()> {
    let (primary, _) = split_region(code);
    lookup(&primary)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_region(code);
    lookup(&primary)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize to ISO 639-1 when one exists, otherwise ISO 639-2/T
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_region(code);
    let lang = lookup(&primary)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let (primary, _) = split_region(code);
    let lang = lookup(&primary)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

/// DeepL expects upper-case codes (`TR`, `EN-US`)
pub fn to_deepl_code(code: &str) -> String {
    code.trim().replace('_', "-").to_uppercase()
}

/// Google and LibreTranslate take lower-case primary subtags, keeping the
/// region for the handful of codes that need it (`zh-CN`, `pt-PT`)
pub fn to_lowercase_code(code: &str) -> String {
    match split_region(code) {
        (primary, Some(region)) => format!("{}-{}", primary, region),
        (primary, None) => primary,
    }
}

/// Build a BCP-47 locale (`tr-TR`) from a bare code, for voice selection
pub fn to_locale(code: &str) -> String {
    match split_region(code) {
        (primary, Some(region)) => format!("{}-{}", primary, region),
        (primary, None) => {
            let region = match primary.as_str() {
                "en" => "US".to_string(),
                "ja" => "JP".to_string(),
                "ko" => "KR".to_string(),
                "zh" => "CN".to_string(),
                other => other.to_uppercase(),
            };
            format!("{}-{}", primary, region)
        }
    }
}
