use super::*;
use crate::llm::config::InferenceTimeouts;

// =========================================================================
// parse_generation
// =========================================================================

#[test]
fn parse_takes_first_generation_trimmed() {
    let json = r#"[{"generated_text":"  Hello! How can I help?\n"}]"#;
    assert_eq!(parse_generation(json).unwrap(), "Hello! How can I help?");
}

#[test]
fn parse_ignores_extra_generations() {
    let json = r#"[{"generated_text":"first"},{"generated_text":"second"}]"#;
    assert_eq!(parse_generation(json).unwrap(), "first");
}

#[test]
fn parse_empty_array_errors() {
    let err = parse_generation("[]").unwrap_err();
    assert!(matches!(err, InferenceError::Parse(_)));
}

#[test]
fn parse_non_array_errors() {
    let err = parse_generation(r#"{"error":"Model is overloaded"}"#).unwrap_err();
    assert!(matches!(err, InferenceError::Parse(_)));
}

#[test]
fn parse_whitespace_only_yields_empty_string() {
    let json = r#"[{"generated_text":"   \n\t"}]"#;
    assert_eq!(parse_generation(json).unwrap(), "");
}

// =========================================================================
// Request wire shape
// =========================================================================

#[test]
fn request_body_is_inputs_only() {
    let body = ApiRequest { inputs: "Explain photosynthesis" };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value, serde_json::json!({ "inputs": "Explain photosynthesis" }));
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn new_keeps_configured_endpoint() {
    let config = InferenceConfig {
        api_key: "hf-secret".into(),
        endpoint: "https://inference.example/models/custom".into(),
        timeouts: InferenceTimeouts { request_secs: 5, connect_secs: 2 },
    };
    let client = InferenceClient::new(config).unwrap();
    assert_eq!(client.endpoint, "https://inference.example/models/custom");
    assert_eq!(client.api_key, "hf-secret");
}
