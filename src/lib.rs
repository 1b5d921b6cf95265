use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use config::Config;
use llm::ModelRouter;
use middleware::{RateLimiter, log_errors, session_middleware};

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod llm;
pub mod middleware;
pub mod result;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub limiter: Arc<RateLimiter>,
    pub models: Arc<ModelRouter>,
}

impl AppState {
    /// The limiter lives as long as the state, one per process
    pub fn new(config: Config, models: ModelRouter) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config));
        Self {
            config,
            limiter,
            models: Arc::new(models),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // chat routes see the caller's session
    let api_routes = Router::new()
        .route("/mentor/chat", post(routes::mentor::chat))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        // public
        .route("/health", get(routes::health::health_check))
        .nest(&state.config.api_base_uri.clone(), api_routes)
        .fallback(routes::health::not_found)
        // log 5xx bodies
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
