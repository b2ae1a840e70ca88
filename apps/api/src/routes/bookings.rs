//! Booking endpoints. All require a bearer token.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use haven_booking::{BookingDetails, CreateBooking};
use haven_core::{Booking, BookingSummary};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

/// POST /bookings: create a pending booking.
#[tracing::instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<CreateBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let Json(input) = payload?;
    let booking = state.bookings.create_booking(&user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings: the caller's bookings, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BookingSummary>>, ApiError> {
    Ok(Json(state.bookings.list_bookings(&user.user_id).await?))
}

/// GET /bookings/{id}: one booking with its payment status.
pub async fn get(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BookingDetails>, ApiError> {
    Ok(Json(state.bookings.get_booking(&user.user_id, &id).await?))
}

/// POST /bookings/{id}/cancel: cancel while still pending.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.bookings.cancel_booking(&user.user_id, &id).await?))
}
