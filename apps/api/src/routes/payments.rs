//! Payment session and gateway callback endpoints.
//!
//! Callbacks authenticate by signature, not bearer token. The signature
//! arrives as the `hmac` query parameter or the `x-paymob-hmac` header.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use haven_booking::{PaymentSession, TransactionCallback, WebhookOutcome};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

const SIGNATURE_HEADER: &str = "x-paymob-hmac";

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub booking_id: Option<String>,
}

/// POST /payments/session: create or reuse the booking's payment session.
#[tracing::instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<PaymentSession>, ApiError> {
    let Json(request) = payload?;
    let booking_id = request.booking_id.unwrap_or_default();
    Ok(Json(state.sessions.initiate_payment(&user.user_id, &booking_id).await?))
}

/// POST /payments/webhook: processed callback with a JSON body.
pub async fn processed_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let callback = TransactionCallback::from_json(&body)?;
    let signature = params
        .get("hmac")
        .map(String::as_str)
        .or_else(|| headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()));

    acknowledge(state.webhooks.handle_callback(&callback, signature).await?)
}

/// GET /payments/webhook: response callback flattened into the query.
pub async fn response_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<&'static str, ApiError> {
    let callback = TransactionCallback::from_query(&params);
    let signature = params.get("hmac").map(String::as_str);

    acknowledge(state.webhooks.handle_callback(&callback, signature).await?)
}

fn acknowledge(outcome: WebhookOutcome) -> Result<&'static str, ApiError> {
    info!(?outcome, "Callback acknowledged");
    Ok("OK")
}
