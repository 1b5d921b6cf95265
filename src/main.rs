use std::net::{IpAddr, SocketAddr};

use nawaetu_backend::{AppState, build_router, config::Config, llm::ModelRouter};
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // load config from .env and the environment
    let config = Config::from_env().expect("Failed to load configuration (is JWT_SECRET set?)");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // providers, in fallback order
    let models = ModelRouter::from_config(&config).expect("Failed to create HTTP client");
    let providers = models.provider_names();
    if providers.is_empty() {
        tracing::warn!("No LLM provider configured, set GEMINI_API_KEY or FALLBACK_API_KEY");
    } else {
        tracing::info!("LLM providers in order: {}", providers.join(" -> "));
    }
    tracing::info!(
        "Mentor chat limited to {} requests per {}ms per caller",
        config.rate_limit_requests,
        config.rate_limit_window_ms
    );

    // app state and routes
    let state = AppState::new(config.clone(), models);
    let router = build_router(state);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // bind and serve
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
