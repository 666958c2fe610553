/*!
 * Tests for the Google Cloud Translation client
 */

use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voicely::errors::ProviderError;
use voicely::providers::TranslationBackend;
use voicely::providers::google::Google;

#[test]
fn test_buildRequest_shouldOmitMissingSource() {
    let request = Google::build_request("Hello", "TR", None);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["q"], "Hello");
    assert_eq!(json["target"], "tr");
    assert_eq!(json["format"], "text");
    assert!(json.get("source").is_none());
}

#[tokio::test]
async fn test_submit_shouldSendKeyAndReadTranslation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(query_param("key", "g-key"))
        .and(body_json(serde_json::json!({
            "q": "Hello", "target": "tr", "source": "en", "format": "text"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "translations": [{ "translatedText": "Merhaba" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let google = Google::new("g-key", server.uri(), Duration::from_secs(5));
    let result = google.submit("Hello", "tr", Some("en")).await.unwrap();

    assert_eq!(result.text, "Merhaba");
    assert_eq!(result.detected_source_language, None);
}

#[tokio::test]
async fn test_submit_shouldReportDetectedLanguage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "translations": [{ "translatedText": "Bonjour", "detectedSourceLanguage": "en" }] }
        })))
        .mount(&server)
        .await;

    let google = Google::new("g-key", server.uri(), Duration::from_secs(5));
    let result = google.submit("Hello", "fr", None).await.unwrap();
    assert_eq!(result.detected_source_language.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_submit_withTooManyRequests_shouldMapToRateLimit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let google = Google::new("g-key", server.uri(), Duration::from_secs(5));
    let error = google.submit("Hello", "fr", None).await.unwrap_err();
    assert!(matches!(error, ProviderError::RateLimitExceeded(ref body) if body == "slow down"));
}

#[tokio::test]
async fn test_submit_withUnreachableHost_shouldFailAsTransportError() {
    let google = Google::new("g-key", "http://127.0.0.1:1", Duration::from_secs(2));
    let error = google.submit("Hello", "fr", None).await.unwrap_err();
    assert!(matches!(
        error,
        ProviderError::ConnectionError(_) | ProviderError::RequestFailed(_)
    ));
}
