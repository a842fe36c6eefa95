use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    state::AppState,
    stripe::{ListReadersParams, PresentPaymentMethod, Reader},
    validate::require_id,
};

const SIMULATED_PAYMENT_METHOD_TYPES: [&str; 2] = ["card_present", "interac_present"];

#[derive(Serialize)]
pub struct ReadersResponse {
    readers: Vec<Reader>,
}

#[derive(Serialize)]
pub struct ReaderStateResponse {
    reader_state: Reader,
}

#[derive(Deserialize)]
pub struct ReaderQuery {
    reader_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ReaderRequest {
    reader_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ProcessPaymentIntentRequest {
    payment_intent_id: Option<String>,
    reader_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SimulatePaymentRequest {
    reader_id: Option<String>,
    card_number: Option<String>,
    amount_tip: Option<i64>,
    payment_method_type: Option<String>,
}

#[instrument(skip_all)]
pub async fn list_readers(
    State(state): State<AppState>,
    query: Result<Query<ListReadersParams>, QueryRejection>,
) -> Result<Json<ReadersResponse>, AppError> {
    let Query(params) = query?;
    if let Some(limit) = params.limit {
        if !(1..=100).contains(&limit) {
            return Err(AppError::bad_request("limit must be between 1 and 100"));
        }
    }

    let readers = state.stripe.list_readers(&params).await?.data;
    tracing::debug!(count = readers.len(), "listed readers");

    Ok(Json(ReadersResponse { readers }))
}

#[instrument(skip_all)]
pub async fn retrieve_reader(
    State(state): State<AppState>,
    query: Result<Query<ReaderQuery>, QueryRejection>,
) -> Result<Json<ReaderStateResponse>, AppError> {
    let Query(query) = query?;
    let reader_id = require_id("reader_id", query.reader_id.as_deref())?;

    let reader_state = state.stripe.retrieve_reader(&reader_id).await?;

    Ok(Json(ReaderStateResponse { reader_state }))
}

/// Hands the PaymentIntent off to the reader, which then prompts for a card.
#[instrument(skip_all)]
pub async fn process_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPaymentIntentRequest>, JsonRejection>,
) -> Result<Json<ReaderStateResponse>, AppError> {
    let Json(req) = payload?;
    let payment_intent_id = require_id("payment_intent_id", req.payment_intent_id.as_deref())?;
    let reader_id = require_id("reader_id", req.reader_id.as_deref())?;

    let reader_state = state
        .stripe
        .process_payment_intent(&reader_id, &payment_intent_id)
        .await?;
    tracing::info!(
        reader = %reader_state.id,
        payment_intent = %payment_intent_id,
        action_status = reader_state.action_status().unwrap_or("none"),
        "handed off payment intent"
    );

    Ok(Json(ReaderStateResponse { reader_state }))
}

/// Simulates a card tap on a simulated reader.
#[instrument(skip_all)]
pub async fn simulate_payment(
    State(state): State<AppState>,
    payload: Result<Json<SimulatePaymentRequest>, JsonRejection>,
) -> Result<Json<ReaderStateResponse>, AppError> {
    let Json(req) = payload?;
    let reader_id = require_id("reader_id", req.reader_id.as_deref())?;
    let payment_method_type = req
        .payment_method_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(kind) = &payment_method_type {
        if !SIMULATED_PAYMENT_METHOD_TYPES.contains(&kind.as_str()) {
            return Err(AppError::bad_request(format!(
                "payment_method_type must be one of: {}",
                SIMULATED_PAYMENT_METHOD_TYPES.join(", ")
            )));
        }
    }
    let params = PresentPaymentMethod {
        card_number: req.card_number.filter(|n| !n.trim().is_empty()),
        amount_tip: req.amount_tip,
        payment_method_type,
    };

    let reader_state = state
        .stripe
        .present_payment_method(&reader_id, &params)
        .await?;
    tracing::info!(
        reader = %reader_state.id,
        action_status = reader_state.action_status().unwrap_or("none"),
        "simulated payment"
    );

    Ok(Json(ReaderStateResponse { reader_state }))
}

/// Returns the reader to idle. Fails only once a card has been presented.
#[instrument(skip_all)]
pub async fn cancel_reader_action(
    State(state): State<AppState>,
    payload: Result<Json<ReaderRequest>, JsonRejection>,
) -> Result<Json<ReaderStateResponse>, AppError> {
    let Json(req) = payload?;
    let reader_id = require_id("reader_id", req.reader_id.as_deref())?;

    let reader_state = state.stripe.cancel_action(&reader_id).await?;
    tracing::info!(reader = %reader_state.id, "canceled reader action");

    Ok(Json(ReaderStateResponse { reader_state }))
}
