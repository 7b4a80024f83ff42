use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Serializable error body shared by every failure response. The presentation
/// layer gets a human-readable message and never has to parse store error
/// text.
#[derive(Serialize)]
pub struct ErrorRep {
    pub message: String,
}

pub enum ApiError {
    /// A required field was missing or failed validation.
    BadRequest(String),
    /// A referenced resource does not exist.
    NotFound(String),
    /// The request was well-formed but violates a domain rule, e.g. a type
    /// mismatch between a transaction and the operation.
    UnprocessableEntity(String),
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_owned(),
            ),
        };

        (status, Json(ErrorRep { message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(?error, "Received error.");

        Self::InternalServerError
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;
