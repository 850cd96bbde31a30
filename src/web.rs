use std::path::Path;

use anyhow::{Context, Result};
use axum::{Router, routing::post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::{self, SharedState};
use crate::config::ServerConfig;

/// Full application router: question endpoint, catalog API and the web page
pub fn app(state: SharedState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let templates = Path::new(&server.templates_dir);

    Router::new()
        .route("/query", post(api::query))
        .nest("/api", api::router())
        .route_service("/", ServeFile::new(templates.join("index.html")))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .nest_service("/templates", ServeDir::new(templates))
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run(state: SharedState, server: &ServerConfig) -> Result<()> {
    let app = app(state, server);

    let addr = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", server.port);

    axum::serve(listener, app)
        .await
        .context("Web server terminated")?;
    Ok(())
}
