//! API error types with HTTP response mapping.
//!
//! Every error leaves as `{ "code": "...", "message": "..." }`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use haven_booking::BookingError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or expired bearer token.
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Request body could not be read.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Booking(err) => match err {
                BookingError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                BookingError::InvalidDateRange(_) => (StatusCode::BAD_REQUEST, "invalid_date_range"),
                BookingError::SignatureMismatch => (StatusCode::UNAUTHORIZED, "signature_mismatch"),
                BookingError::RoomNotFound(_) => (StatusCode::NOT_FOUND, "room_not_found"),
                BookingError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                BookingError::RoomUnavailable { .. } => (StatusCode::CONFLICT, "room_unavailable"),
                BookingError::InvalidState(_) => (StatusCode::CONFLICT, "invalid_state"),
                BookingError::AlreadyPaid(_) => (StatusCode::CONFLICT, "already_paid"),
                BookingError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
                BookingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!(code, error = %self, "Request failed");
            // Storage and internal details stay in the log
            match &self {
                ApiError::Booking(BookingError::Provider(_)) => self.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            if status == StatusCode::UNAUTHORIZED {
                warn!(code, "Unauthenticated request");
            }
            self.to_string()
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
