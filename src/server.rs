//! # Server Module
//!
//! HTTP server setup and route configuration for the garden server.

use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::CONFIG;
use crate::readers::snapshot::SnapshotAssembler;
use crate::routes::garden;
use crate::routes::health::ping;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<SnapshotAssembler>,
}

/// Starts the garden HTTP server.
///
/// Initializes the reader layer, builds the router and serves it with the
/// Axum framework on the configured address.
pub async fn start() {
    // Initialize the snapshot assembler (all upstream readers)
    let assembler = match SnapshotAssembler::from_config() {
        Ok(assembler) => Arc::new(assembler),
        Err(e) => {
            tracing::error!("Failed to initialize snapshot assembler: {}", e);
            panic!("Cannot start server without upstream readers");
        }
    };

    let app_state = AppState { assembler };

    use tower::ServiceBuilder;
    // Main app router
    let app = Router::new()
        .route("/ping", get(ping)) // Health check endpoint
        .merge(garden::create_routes())
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                    .allow_headers([
                        axum::http::header::ORIGIN,
                        axum::http::header::CONTENT_TYPE,
                        axum::http::header::ACCEPT,
                    ]),
            ),
        )
        .with_state(app_state);

    // Use $PORT if set (container platforms), otherwise the configured port
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(CONFIG.server.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address - port may already be in use");

    tracing::info!("Garden server starting...");
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/ping", addr);
    tracing::info!(
        "Portfolio endpoints available at http://{}/api/v1/garden/*",
        addr
    );

    // Start serving the application
    axum::serve(listener, app).await.unwrap();
}
