use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway credential is not configured")]
    MissingCredential,

    #[error("gateway rate limit exceeded")]
    RateLimited,

    #[error("gateway usage quota exhausted")]
    QuotaExhausted,

    #[error("gateway returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway response was not readable: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Status code the failure should be reported to callers with.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::RateLimited => 429,
            GatewayError::QuotaExhausted => 402,
            _ => 500,
        }
    }

    /// What a caller may be shown. Anything that is our fault or the
    /// gateway's stays opaque; the detail goes to the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::RateLimited => "Rate limit exceeded. Please try again shortly.",
            GatewayError::QuotaExhausted => "AI usage limit reached. Please add credits.",
            GatewayError::MissingCredential => "AI service is not configured",
            _ => "AI service error",
        }
    }
}
