use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forms::FormError;
use gateway::GatewayError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Message for the response body. Gateway detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Gateway(e) => e.public_message().to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(
            ApiError::from(GatewayError::RateLimited).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(GatewayError::QuotaExhausted).status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ApiError::from(GatewayError::MissingCredential).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::from(FormError::Missing("district")).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_detail_is_hidden() {
        let err = ApiError::from(GatewayError::Upstream {
            status: 503,
            body: "internal stack trace".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "AI service error");
    }
}
