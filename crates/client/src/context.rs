use extract::{ChannelResult, FundingResult, RecommendationResult};
use serde_json::Value;

/// The last result the user looked at, handed to the chat as context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultContext {
    #[default]
    Absent,
    Recommendation(RecommendationResult),
    Channels(ChannelResult),
    Funding(FundingResult),
}

impl ResultContext {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultContext::Absent => "none",
            ResultContext::Recommendation(_) => "recommendation",
            ResultContext::Channels(_) => "channels",
            ResultContext::Funding(_) => "funding",
        }
    }

    /// JSON given to the chat prompt; `null` when nothing has been shown yet.
    pub fn to_value(&self) -> Value {
        let value = match self {
            ResultContext::Absent => return Value::Null,
            ResultContext::Recommendation(r) => serde_json::to_value(r),
            ResultContext::Channels(c) => serde_json::to_value(c),
            ResultContext::Funding(f) => serde_json::to_value(f),
        };
        value.unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_null() {
        assert_eq!(ResultContext::default().to_value(), Value::Null);
        assert_eq!(ResultContext::Absent.kind(), "none");
    }

    #[test]
    fn test_recommendation_serializes_camel_case() {
        let ctx = ResultContext::Recommendation(RecommendationResult {
            hospitals: vec![],
            schemes: vec![],
            ngos: vec![],
            overall_confidence: 77,
            reasoning: "ok".to_string(),
        });
        let value = ctx.to_value();
        assert_eq!(value["overallConfidence"], 77);
        assert_eq!(ctx.kind(), "recommendation");
    }
}
