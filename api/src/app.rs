use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{payment_intents, readers, state::AppState};

async fn health() -> &'static str {
    "ok"
}

pub fn build_app(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/reader", ServeFile::new(static_dir.join("reader.html")))
        .route("/list-readers", get(readers::list_readers))
        .route("/retrieve-reader", get(readers::retrieve_reader))
        .route(
            "/process-payment-intent",
            post(readers::process_payment_intent),
        )
        .route("/simulate-payment", post(readers::simulate_payment))
        .route("/cancel-reader-action", post(readers::cancel_reader_action))
        .route(
            "/create-payment-intent",
            post(payment_intents::create_payment_intent),
        )
        .route(
            "/retrieve-payment-intent",
            get(payment_intents::retrieve_payment_intent),
        )
        .route(
            "/capture-payment-intent",
            post(payment_intents::capture_payment_intent),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
