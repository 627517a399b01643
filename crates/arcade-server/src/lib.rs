pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let state = AppState::new(config);

    let api_routes = Router::new()
        .route("/auth", post(api::post_auth).get(api::get_auth))
        .route("/settings", post(api::post_settings))
        .route("/employees", post(api::post_employees))
        .route("/scores", post(api::post_score).get(api::get_scores))
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&web_root))
        .with_state(state.clone());

    (app, state)
}
