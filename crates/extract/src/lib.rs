//! Turning free-text model completions into something renderable.
//!
//! The server side only needs [`extract_json`]; clients classify the
//! resulting body once with [`Outcome`].

pub mod fence;
pub mod lenient;
pub mod outcome;
pub mod schema;

pub use fence::strip_fence;
pub use outcome::{Failure, FailureKind, Outcome};
pub use schema::{
    Channel, ChannelResult, ChannelType, Funder, FunderType, FundingCapacity, FundingResult,
    Hospital, Ngo, Priority, RecommendationResult, Scheme,
};

use serde_json::{Value, json};

/// Result of reading a completion as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Parsed(Value),
    /// The completion, untouched, for display as-is.
    Degraded { raw: String },
}

impl Extracted {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Extracted::Degraded { .. })
    }

    /// Response body: the parsed value, or `{raw, parseError: true}`.
    pub fn into_body(self) -> Value {
        match self {
            Extracted::Parsed(value) => value,
            Extracted::Degraded { raw } => json!({ "raw": raw, "parseError": true }),
        }
    }
}

/// Strip an optional fenced block and strictly parse what remains.
pub fn extract(completion: &str) -> Extracted {
    let candidate = strip_fence(completion);
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Extracted::Parsed(value),
        Err(e) => {
            tracing::warn!(error = %e, len = completion.len(), "model output is not valid JSON");
            Extracted::Degraded {
                raw: completion.to_string(),
            }
        }
    }
}

/// [`extract`] straight to a response body.
pub fn extract_json(completion: &str) -> Value {
    extract(completion).into_body()
}
