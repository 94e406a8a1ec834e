use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use crate::api;
use crate::config::TripAiConfig;
use crate::planner::{ImageLookup, LlmPlannerClient};
use crate::session::Controller;

/// CORS for the configured origins; an empty list allows any origin
fn cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .await
        .with_context(|| "Server error")
}

/// Run the session API, optionally serving a built front-end as fallback
pub async fn run_session_server(
    config: &TripAiConfig,
    controller: Arc<Controller>,
    port: u16,
) -> Result<()> {
    let mut app = Router::new().nest("/api", api::router(controller));

    if let Some(dir) = &config.server.static_dir {
        info!("Serving front-end from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app.layer(cors(&config.server.allowed_origins));
    info!("Session API running at http://localhost:{}/api/session", port);
    serve(app, &config.server.host, port).await
}

/// Run the planner proxy backed by the LLM planner
pub async fn run_proxy_server(config: &TripAiConfig, port: u16) -> Result<()> {
    let planner = LlmPlannerClient::from_config(&config.planner)
        .with_context(|| "Planner proxy needs an LLM API key (set OPENAI_API_KEY)")?;
    let images = ImageLookup::new(&config.planner.images);

    // leave room for the image lookups after the model answered
    let request_timeout = Duration::from_secs(u64::from(config.planner.timeout_seconds) + 10);

    let app = api::proxy::router(planner, images)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(cors(&config.server.allowed_origins));

    info!(
        "Planner proxy running at http://localhost:{} (model {})",
        port, config.planner.llm.model
    );
    serve(app, &config.server.host, port).await
}
