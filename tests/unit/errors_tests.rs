/*!
 * Tests for error types and conversions
 */

use voicely::errors::{
    ErrorPayload, ExtractionError, FormatError, PipelineError, ProviderError, StoreError, TranslationError,
};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Service unavailable"));
}

#[test]
fn test_providerError_timeout_shouldMentionMilliseconds() {
    let display = ProviderError::Timeout(10_000).to_string();
    assert!(display.contains("10000 ms"));
}

#[test]
fn test_translationError_allProvidersUnavailable_shouldListFailures() {
    let error = TranslationError::AllProvidersUnavailable {
        failures: vec!["deepl: boom".to_string(), "google: bust".to_string()],
    };
    let display = error.to_string();
    assert!(display.contains("deepl: boom"));
    assert!(display.contains("google: bust"));
    assert_eq!(error.kind(), "AllProvidersUnavailable");
}

#[test]
fn test_translationError_kinds_shouldMatchTaxonomy() {
    assert_eq!(TranslationError::InputTooLong { length: 5001, limit: 5000 }.kind(), "InputTooLong");
    assert_eq!(TranslationError::UnknownProvider("bing".to_string()).kind(), "ProviderError");
    let pinned = TranslationError::Provider {
        provider: "deepl".to_string(),
        source: ProviderError::AuthenticationError("bad key".to_string()),
    };
    assert_eq!(pinned.kind(), "ProviderError");
    assert!(pinned.to_string().contains("deepl"));
}

#[test]
fn test_pipelineError_kinds_shouldMatchTaxonomy() {
    let cases: Vec<(PipelineError, &str)> = vec![
        (
            PipelineError::RejectedFileType {
                file_name: "a.exe".to_string(),
                reason: "nope".to_string(),
            },
            "RejectedFileType",
        ),
        (ExtractionError::UnsupportedFormat("rtf".to_string()).into(), "UnsupportedFormat"),
        (ExtractionError::TranscriptionFailed("x".to_string()).into(), "TranscriptionFailed"),
        (FormatError::FormatNotApplicable("srt".to_string()).into(), "FormatNotApplicable"),
        (FormatError::UnsupportedOutputKind("mp4".to_string()).into(), "UnsupportedOutputKind"),
        (PipelineError::PersistenceFailed("disk".to_string()), "PersistenceFailed"),
        (PipelineError::NotFound("id".to_string()), "NotFound"),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "wrong kind for {:?}", error);
    }
}

#[test]
fn test_pipelineError_translationFailed_shouldKeepOriginalText() {
    let error = PipelineError::TranslationFailed {
        original_text: "Hello world.".to_string(),
        source: TranslationError::AllProvidersUnavailable { failures: vec![] },
    };
    assert_eq!(error.kind(), "TranslationFailed");
    assert_eq!(error.original_text(), Some("Hello world."));
    assert_eq!(PipelineError::NotFound("x".to_string()).original_text(), None);
}

#[test]
fn test_pipelineError_fromStoreError_shouldMapNotFound() {
    let not_found: PipelineError = StoreError::NotFound("abc.txt".to_string()).into();
    assert_eq!(not_found.kind(), "NotFound");

    let io: PipelineError = StoreError::Io("disk full".to_string()).into();
    assert_eq!(io.kind(), "PersistenceFailed");
}

#[test]
fn test_errorPayload_shouldSerializeKindAndMessage() {
    let error: PipelineError = FormatError::FormatNotApplicable("srt".to_string()).into();
    let payload = ErrorPayload::from(&error);
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["kind"], "FormatNotApplicable");
    assert!(json["message"].as_str().unwrap().contains("srt"));
}
