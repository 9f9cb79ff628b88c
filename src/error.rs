use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::models::{ApiEnvelope, ApiError};

/// Everything a proxy cycle can fail with. Each variant carries the wire
/// code and the HTTP status it maps to; the handler boundary converts every
/// failure into the `Failed` envelope so nothing surfaces unstructured.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid API Key")]
    Unauthorized,

    #[error("{0}")]
    InvalidPrompt(String),

    #[error("{0}")]
    InvalidParameters(String),

    /// Model rejected by local validation (`upstream: false`) or reported
    /// missing by the upstream itself (`upstream: true`).
    #[error("{message}")]
    ModelNotFound { message: String, upstream: bool },

    #[error("Gemini API quota exceeded. Please try again later.")]
    Quota,

    #[error("Gemini API call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("{0}")]
    Upstream(String),
}

impl ProxyError {
    /// Stable wire code for the failure envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidPrompt(_) => "INVALID_PROMPT",
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::Quota => "QUOTA_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidPrompt(_) | Self::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            Self::ModelNotFound { upstream: false, .. } => StatusCode::BAD_REQUEST,
            Self::ModelNotFound { upstream: true, .. } => StatusCode::BAD_GATEWAY,
            Self::Quota => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// True when the failure happened before any upstream interaction.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::InvalidPrompt(_)
                | Self::InvalidParameters(_)
                | Self::ModelNotFound { upstream: false, .. }
        )
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let envelope = ApiEnvelope::failure(vec![ApiError {
            code: self.code().to_string(),
            message: self.to_string(),
        }]);
        let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| b"{}".to_vec());
        Response::builder()
            .status(self.status())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_maps_to_401() {
        assert_eq!(ProxyError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_maps_to_400() {
        let cases = [
            ProxyError::InvalidPrompt("empty".into()),
            ProxyError::InvalidParameters("one of two".into()),
            ProxyError::ModelNotFound {
                message: "bad model".into(),
                upstream: false,
            },
        ];
        for err in cases {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert!(err.is_local());
        }
    }

    #[test]
    fn upstream_classes_map_to_429_502_504() {
        assert_eq!(ProxyError::Quota.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ProxyError::Upstream("boom".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::ModelNotFound {
                message: "gone".into(),
                upstream: true
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::Timeout { seconds: 60 }.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ProxyError::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(ProxyError::Quota.code(), "QUOTA_ERROR");
        assert_eq!(ProxyError::Timeout { seconds: 1 }.code(), "TIMEOUT");
        assert_eq!(ProxyError::Upstream("x".into()).code(), "UPSTREAM_ERROR");
    }
}
