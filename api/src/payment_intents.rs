use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    state::AppState,
    stripe::{CreatePaymentIntent, PaymentIntent},
    validate::require_id,
};

#[derive(Deserialize)]
pub struct CreatePaymentIntentRequest {
    amount: Option<i64>,
}

#[derive(Serialize)]
pub struct CreatePaymentIntentResponse {
    payment_intent_id: String,
}

#[derive(Deserialize)]
pub struct PaymentIntentQuery {
    payment_intent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CapturePaymentIntentRequest {
    payment_intent_id: Option<String>,
}

#[derive(Serialize)]
pub struct PaymentIntentResponse {
    payment_intent: PaymentIntent,
}

/// Creates a `card_present`, manually captured PaymentIntent in USD.
#[instrument(skip_all)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentIntentResponse>, AppError> {
    let Json(req) = payload?;
    let amount = req
        .amount
        .ok_or_else(|| AppError::bad_request("Missing required param: amount."))?;
    if amount <= 0 {
        return Err(AppError::bad_request("amount must be > 0"));
    }

    let idempotency_key = match headers.get("idempotency-key") {
        Some(value) => {
            let key = value
                .to_str()
                .map_err(|_| AppError::bad_request("Idempotency-Key must be ASCII"))?
                .trim();
            (!key.is_empty()).then_some(key)
        }
        None => None,
    };

    let intent = state
        .stripe
        .create_payment_intent(&CreatePaymentIntent::card_present(amount), idempotency_key)
        .await?;
    tracing::info!(payment_intent = %intent.id, amount, "created payment intent");

    Ok(Json(CreatePaymentIntentResponse {
        payment_intent_id: intent.id,
    }))
}

#[instrument(skip_all)]
pub async fn retrieve_payment_intent(
    State(state): State<AppState>,
    query: Result<Query<PaymentIntentQuery>, QueryRejection>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let Query(query) = query?;
    let id = require_id("payment_intent_id", query.payment_intent_id.as_deref())?;

    let payment_intent = state.stripe.retrieve_payment_intent(&id).await?;

    Ok(Json(PaymentIntentResponse { payment_intent }))
}

/// Captures an authorized but uncaptured PaymentIntent.
#[instrument(skip_all)]
pub async fn capture_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CapturePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let Json(req) = payload?;
    let id = require_id("payment_intent_id", req.payment_intent_id.as_deref())?;

    let payment_intent = state.stripe.capture_payment_intent(&id).await?;
    tracing::info!(
        payment_intent = %payment_intent.id,
        status = %payment_intent.status,
        amount = payment_intent.amount,
        "captured payment intent"
    );

    Ok(Json(PaymentIntentResponse { payment_intent }))
}
