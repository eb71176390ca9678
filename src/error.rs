// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures while acquiring an access token from the identity service
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required credential is unset (operator misconfiguration)
    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    /// Token endpoint responded with a non-success status
    #[error("token endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    /// Token endpoint was unreachable
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token endpoint returned a success status with an unusable body
    #[error("unexpected token response: {0}")]
    InvalidResponse(String),
}

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Upstream credentials are misconfigured
    #[error("auth configuration error: {0}")]
    AuthConfig(String),

    /// Token acquisition failed
    #[error("upstream auth failed: {0}")]
    AuthRequest(String),

    /// Caller omitted a required parameter
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected failure while relaying to the scheduling API
    #[error("proxy failure: {0}")]
    ProxyFailure(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingConfig(_) => ApiError::AuthConfig(message),
            _ => ApiError::AuthRequest(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::AuthConfig(message) | ApiError::AuthRequest(message) => {
                tracing::error!("token acquisition failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
            ApiError::ProxyFailure(err) => {
                tracing::error!("proxy failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "proxy failure",
                        "detail": format!("{:#}", err),
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
