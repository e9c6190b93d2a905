//! # Garden Server
//!
//! Yield optimization and pairing engine for on-chain gardening quests -
//! an HTTP API server built with Rust, Axum, and Tokio.
//!
//! ## Features
//! - Async/await HTTP server using Axum framework
//! - Structured logging with tracing
//! - Health check endpoints for monitoring
//! - Concurrent reader layer assembling wallet snapshots from the game
//!   indexer, expedition API and price feed
//! - Pure, synchronous yield engine: optimal-stamina search, greedy
//!   multi-pool hero/pet allocation and tiered pairing detection
//!
//! ## Architecture
//! The server is organized into modules:
//! - `server`: Core server initialization and configuration
//! - `config`: Environment variable configuration management
//! - `readers`: External collaborators fetching heroes, pets, pools,
//!   reward funds, LP positions, quest evidence and prices
//! - `engine`: The yield optimization and pairing engine
//! - `routes`: HTTP route handlers organized by functionality
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! The server will start on `http://127.0.0.1:3000` by default.
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:3000/ping
//! ```

use garden_server::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point.
///
/// Initializes the tracing/logging system and starts the HTTP server.
/// This function will run indefinitely until the process is terminated.
#[tokio::main]
async fn main() {
    // Environment from .env when present; real env vars win
    dotenv::dotenv().ok();

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(), // Use compact formatting
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Log application startup
    tracing::info!("Starting garden server...");
    tracing::info!(
        "Package: {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Build profile: {}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );

    // Start the HTTP server - this will run indefinitely
    server::start().await;
}
