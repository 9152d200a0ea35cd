use std::sync::Arc;
use std::time::Duration;

use axum::{http::Method, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use skyfinder_store::app_config::Config;
use skyfinder_store::InMemorySessionStore;

pub mod client;
pub mod error;
pub mod resiliency;
pub mod search;
pub mod state;

pub use state::AppState;

use client::{HttpSearchClient, SearchClientError};
use resiliency::{CircuitBreaker, GuardedSearchService};
use state::SearchSettings;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/health", get(health))
        .merge(search::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wires the HTTP search client, its circuit breaker and the session store
/// from configuration.
pub fn build_state(config: &Config) -> Result<AppState, SearchClientError> {
    let client = HttpSearchClient::new(&config.search)?;
    let breaker = CircuitBreaker::new(
        "search",
        config.search.breaker_threshold,
        Duration::from_secs(config.search.breaker_reset_seconds),
    );

    Ok(AppState {
        search: Arc::new(GuardedSearchService::new(client, breaker)),
        sessions: Arc::new(InMemorySessionStore::new(config.sessions.capacity)),
        settings: SearchSettings::from(&config.search),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
