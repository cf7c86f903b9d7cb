//! HTTP surface: a thin axum layer over the retrieval pipeline.

pub mod dto;
mod handlers;
mod state;

pub use state::AppState;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/timezone/status", get(handlers::status))
        .route(
            "/api/v1/timezone",
            get(handlers::get_timezone).post(handlers::post_timezone),
        )
        .route("/api/v1/timezone/conversion", post(handlers::convert_time))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
