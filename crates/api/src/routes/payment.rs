//! Payment gateway route handlers.
//!
//! The config endpoint hands out only the public key id. The key secret
//! stays server-side: it signs callback verification and authenticates
//! gateway API calls, and a client never needs it.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{JsonBody, RequireUser};
use crate::services::payment::{GatewayOrder, GatewayOrderRequest};
use crate::state::AppState;

/// Client-side checkout configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfigResponse {
    pub razorpay_key_id: String,
}

/// Callback validation body, as posted by the gateway's checkout widget.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateCallbackRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Acknowledgment for a verified callback.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCallbackResponse {
    /// The verified gateway payment id.
    pub id: String,
    pub status: String,
    pub message: String,
    pub update_time: DateTime<Utc>,
}

/// `GET /api/v1/payment/razorpay/config` — checkout configuration.
#[instrument(skip(state))]
pub async fn config(State(state): State<AppState>) -> Json<PaymentConfigResponse> {
    Json(PaymentConfigResponse {
        razorpay_key_id: state.payment().key_id().to_owned(),
    })
}

/// `POST /api/v1/payment/razorpay/order` — create a gateway order.
#[instrument(skip(state, _user, body))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    JsonBody(body): JsonBody<GatewayOrderRequest>,
) -> Result<(StatusCode, Json<GatewayOrder>)> {
    let order = state.payment().create_order(&body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `POST /api/v1/payment/razorpay/order/validate` — verify a callback.
///
/// Success here only acknowledges the signature; marking the order paid
/// is the separate `PUT /orders/{id}/pay` transition.
#[instrument(skip(state, body))]
pub async fn validate(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ValidateCallbackRequest>,
) -> Result<(StatusCode, Json<ValidateCallbackResponse>)> {
    state.payment().verify_callback(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ValidateCallbackResponse {
            id: body.razorpay_payment_id,
            status: "success".to_owned(),
            message: "payment is successful".to_owned(),
            update_time: Utc::now(),
        }),
    ))
}
