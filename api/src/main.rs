use terminal_api::{config::Config, state::AppState, stripe::StripeClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("terminal_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("invalid configuration (check .env)");

    let stripe =
        StripeClient::new(config.stripe.clone()).expect("failed to build payment api client");

    let state = AppState {
        stripe,
        static_dir: config.static_dir.clone(),
    };

    let app = terminal_api::app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {}: {e}", config.bind_addr));

    tracing::info!(
        addr = %config.bind_addr,
        static_dir = %config.static_dir.display(),
        "terminal server listening"
    );
    axum::serve(listener, app).await.expect("server error");
}
