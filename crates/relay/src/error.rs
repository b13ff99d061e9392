use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures while handling a webhook request
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Uplink notification must be a JSON object")]
    NotAnObject,

    #[error("Device ID missing")]
    DeviceIdMissing,

    #[error("Failed to forward position to {url}: {source}")]
    Forward {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Traccar responded with {status} for {url}")]
    ForwardStatus { url: String, status: StatusCode },
}

impl RelayError {
    /// Status code returned to the webhook caller.
    ///
    /// Only authentication failures surface as an HTTP error; everything after
    /// the auth gate is reported in the body with `200 OK`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic")],
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            _ => (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
