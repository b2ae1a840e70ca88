//! In-app notification endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use haven_booking::BookingError;
use haven_core::Notification;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

/// GET /notifications: newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .db
        .notifications()
        .list_for_user(&user.user_id)
        .await
        .map_err(BookingError::from)?;
    Ok(Json(notifications))
}

/// POST /notifications/{id}/read: owner only; others get 404.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .db
        .notifications()
        .mark_read(&id, &user.user_id)
        .await
        .map_err(BookingError::from)?;

    if !updated {
        return Err(BookingError::not_found("Notification", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
