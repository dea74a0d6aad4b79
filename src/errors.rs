use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::book::BookValidationError;
use crate::store::StoreError;

// ============================================================================
// API Error Taxonomy
// ============================================================================
//
// Every failure a request can produce maps to exactly one of these variants.
// Server errors carry their cause for the operator log only; the response
// body stays opaque.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Server error")]
    Server(#[source] anyhow::Error),
}

impl ApiError {
    pub fn server(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Server(err.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Not found".to_string()),
            StoreError::Backend(e) => ApiError::Server(e),
        }
    }
}

impl From<BookValidationError> for ApiError {
    fn from(err: BookValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Server(cause) = self {
            tracing::error!("request failed with server error: {:#}", cause);
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string(),
        }))
    }
}
