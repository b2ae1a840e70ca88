//! Room availability endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use haven_booking::AvailabilityQuery;
use haven_core::RoomListing;

use crate::error::ApiError;
use crate::AppState;

/// GET /rooms/available: rooms with no confirmed booking over the stay.
#[tracing::instrument(skip(state))]
pub async fn available(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<RoomListing>>, ApiError> {
    Ok(Json(state.bookings.search_available(&query).await?))
}
