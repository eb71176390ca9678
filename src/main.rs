use anyhow::Result;
use axum::Router;
use std::sync::Arc;

use cs_relay::{auth::AuthManager, config::Config, middleware, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!("CS relay starting");
    tracing::info!("Token endpoint: {}", config.token_url);
    tracing::info!("Scheduling API: {}", config.base_url);

    // One shared HTTP client for token fetches and relayed requests
    let client = reqwest::Client::new();

    let config = Arc::new(config);
    let auth = Arc::new(AuthManager::new(config.clone(), client.clone()));

    // Probe authentication once so misconfigured credentials show up in the
    // startup log rather than on the first browser request
    match auth.get_access_token().await {
        Ok(_) => tracing::info!("Upstream authentication successful"),
        Err(e) => {
            tracing::warn!("Upstream authentication failed: {}", e);
            tracing::warn!("Server will start; token acquisition is retried per request");
        }
    }

    let state = routes::AppState {
        config: config.clone(),
        auth,
        http: client,
    };

    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Build the application with all routes and middleware
fn build_app(state: routes::AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::api_routes(state))
        .layer(middleware::cors_layer())
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
