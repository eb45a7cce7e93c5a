use super::*;

#[derive(Debug)]
struct Flaky;

impl std::fmt::Display for Flaky {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("storage hiccup")
    }
}

impl ErrorCode for Flaky {
    fn error_code(&self) -> &'static str {
        "E_FLAKY"
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct Missing;

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("gone")
    }
}

impl ErrorCode for Missing {
    fn error_code(&self) -> &'static str {
        "E_MISSING"
    }
}

#[test]
fn body_carries_code_message_and_retry_hint() {
    let body = ErrorBody::from_error(&Flaky);
    assert_eq!(body.code, "E_FLAKY");
    assert_eq!(body.message, "storage hiccup");
    assert!(body.retryable);
}

#[test]
fn retryable_defaults_to_false() {
    let body = ErrorBody::from_error(&Missing);
    assert!(!body.retryable);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({"code": "E_MISSING", "message": "gone", "retryable": false}));
}
