use serde_json::Value;
use thiserror::Error;

/// Why a remote attempt did not produce a usable body
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteFailure {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Malformed remote body: {0}")]
    MalformedBody(String),
}

impl RemoteFailure {
    /// Label value for the fallback counter
    pub fn reason_label(&self) -> &'static str {
        match self {
            RemoteFailure::Transport(_) => "transport",
            RemoteFailure::Status { .. } => "status",
            RemoteFailure::MalformedBody(_) => "malformed",
        }
    }
}

/// Result of exactly one remote attempt. Never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome<T> {
    Success(T),
    Failure(RemoteFailure),
}

impl<T> RemoteOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteOutcome::Success(_))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> RemoteOutcome<U>) -> RemoteOutcome<U> {
        match self {
            RemoteOutcome::Success(value) => f(value),
            RemoteOutcome::Failure(failure) => RemoteOutcome::Failure(failure),
        }
    }
}

/// Accept `body` only if it is an object carrying every key in `required`
pub fn require_keys(body: Value, required: &[&str]) -> RemoteOutcome<Value> {
    let Some(object) = body.as_object() else {
        return RemoteOutcome::Failure(RemoteFailure::MalformedBody("expected a JSON object".to_string()));
    };

    match required.iter().find(|key| !object.contains_key(**key)) {
        Some(missing) => RemoteOutcome::Failure(RemoteFailure::MalformedBody(format!("missing key `{missing}`"))),
        None => RemoteOutcome::Success(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_keys_accepts_complete_body() {
        let body = json!({"salesData": [], "extra": 1});
        assert_eq!(require_keys(body.clone(), &["salesData"]), RemoteOutcome::Success(body));
    }

    #[test]
    fn test_require_keys_rejects_missing_key() {
        let outcome = require_keys(json!({"orders": []}), &["orders", "pagination"]);
        match outcome {
            RemoteOutcome::Failure(RemoteFailure::MalformedBody(reason)) => assert!(reason.contains("pagination")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_require_keys_rejects_non_object() {
        let outcome = require_keys(json!([1, 2, 3]), &[]);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(RemoteFailure::Transport("refused".into()).reason_label(), "transport");
        assert_eq!(
            RemoteFailure::Status {
                status: 503,
                body: String::new()
            }
            .reason_label(),
            "status"
        );
        assert_eq!(RemoteFailure::MalformedBody("x".into()).reason_label(), "malformed");
    }

    #[test]
    fn test_and_then_short_circuits_failure() {
        let failed: RemoteOutcome<i32> = RemoteOutcome::Failure(RemoteFailure::Transport("down".into()));
        let chained = failed.and_then(|v| RemoteOutcome::Success(v + 1));
        assert_eq!(chained, RemoteOutcome::Failure(RemoteFailure::Transport("down".into())));
    }
}
