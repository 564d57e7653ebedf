use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required parameters")]
    Validation { missing: Vec<&'static str> },

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Authorization header required")]
    AuthRequired,

    #[error("{label}")]
    Upstream {
        /// Human-facing label, e.g. "Token exchange failed"
        label: &'static str,
        status: u16,
        body: String,
        hint: Option<&'static str>,
    },

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<String> },

    #[error("Failed to parse upstream response")]
    Parse { raw: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Parse { .. } | Self::Transport(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-checkable error code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::AuthRequired => "auth_required",
            Self::Upstream { .. } => "upstream_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::Parse { .. } => "parse_error",
            Self::Transport(_) => "transport_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Structured JSON body for this error: a human-readable `error` label, a
    /// machine-checkable `code`, and variant-specific detail. Carries field
    /// names and upstream bodies, never secret values or stack traces.
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            Self::Validation { missing } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "missing": missing,
            }),
            Self::Upstream { label, status, body, hint } => json!({
                "error": label,
                "code": self.code(),
                "twitterError": body,
                "status": status,
                "details": hint,
            }),
            Self::RateLimited { retry_after } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "message": "Twitter API rate limit reached. Please wait a few minutes and try again.",
                "retryAfter": retry_after,
                "suggestion": "Rate limits reset every 15 minutes.",
            }),
            Self::Parse { raw } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "rawResponse": raw,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": self.code(),
            }),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failure (DNS/connect/timeout), distinct from a
        // relayed upstream error status.
        AppError::Transport(err.to_string())
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(
            error = %self,
            code = self.code(),
            status = %status.as_u16(),
            "Request failed"
        );

        (status, Json(self.to_body())).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
