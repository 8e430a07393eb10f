use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sorteo::{
    api, auth,
    state::{AppState, RaffleConfig},
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sorteo=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sorteo...");

    let auth_config = Arc::new(auth::AuthConfig::from_env());
    let config = RaffleConfig::from_env();
    let port = config.port;

    let state = Arc::new(AppState::new_with_config(config));

    // Protected operator page (with HTTP Basic Auth)
    let operator_routes = Router::new()
        .route("/operator", get(auth::serve_operator))
        .layer(middleware::from_fn_with_state(
            auth_config.clone(),
            auth::operator_auth_middleware,
        ));

    // WebSocket route; operator connections require credentials too
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            auth_config.clone(),
            auth::operator_ws_auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/api/winners.csv", get(api::export_winners_csv))
        .route("/api/state", get(api::export_snapshot));

    let app = Router::new()
        .merge(ws_routes)
        .merge(operator_routes)
        .merge(api_routes)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // 8379 is ascii for "SO"
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
