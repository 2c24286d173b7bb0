use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::util::error_response;

/// Errors surfaced to API callers as `{"error": "<message>"}`.
///
/// Upstream non-2xx responses are not represented here; they are relayed
/// verbatim with the upstream status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Model '{0}' is not supported.")]
    UnsupportedModel(String),

    #[error("Image model '{0}' is not supported.")]
    UnsupportedImageModel(String),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidBody(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedModel(_)
            | ApiError::UnsupportedImageModel(_)
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidUpstreamUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), &self.to_string())
    }
}
