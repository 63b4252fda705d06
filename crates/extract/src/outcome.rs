use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Why a request produced no result at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Upstream 429; worth trying again later.
    RateLimited,
    /// Upstream 402; retrying will not help.
    QuotaExhausted,
    /// The request itself was rejected.
    BadRequest,
    /// The server or its gateway failed.
    Upstream,
    /// The server could not be reached or answered with something unreadable.
    Unreachable,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => FailureKind::RateLimited,
            402 => FailureKind::QuotaExhausted,
            400..=499 => FailureKind::BadRequest,
            _ => FailureKind::Upstream,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::Unreachable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A response classified once at the boundary: a typed result, the model's
/// raw text when it could not be read, or a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded(String),
    Failed(Failure),
}

impl<T> Outcome<T> {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failed(Failure {
            kind,
            message: message.into(),
        })
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Degraded(raw) => Outcome::Degraded(raw),
            Outcome::Failed(failure) => Outcome::Failed(failure),
        }
    }
}

impl<T: DeserializeOwned> Outcome<T> {
    /// Classify a function response by status and body.
    pub fn from_response(status: u16, body: Value) -> Self {
        if !(200..300).contains(&status) {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Outcome::failed(FailureKind::from_status(status), message);
        }
        Self::from_body(body)
    }

    /// Classify a successful body. Objects that parsed as JSON but do not
    /// match `T` are shown as raw text rather than dropped.
    pub fn from_body(body: Value) -> Self {
        if let Some(message) = error_message(&body) {
            return Outcome::failed(FailureKind::Upstream, message);
        }

        if body.get("parseError").and_then(Value::as_bool) == Some(true) {
            let raw = body
                .get("raw")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Outcome::Degraded(raw);
        }

        match serde_json::from_value::<T>(body.clone()) {
            Ok(value) => Outcome::Ok(value),
            Err(e) => {
                tracing::debug!(error = %e, "result did not match schema, showing raw");
                let raw = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                Outcome::Degraded(raw)
            }
        }
    }
}

impl<T: Serialize> Outcome<T> {
    /// The wire shape: the entity object, `{raw, parseError}` or `{error}`.
    pub fn to_wire(&self) -> Value {
        match self {
            Outcome::Ok(value) => serde_json::to_value(value).unwrap_or(Value::Null),
            Outcome::Degraded(raw) => json!({ "raw": raw, "parseError": true }),
            Outcome::Failed(failure) => json!({ "error": failure.message }),
        }
    }
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
