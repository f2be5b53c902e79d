// Bookshelf - Main GraphQL Server
// Run with: cargo run --bin server

//! # Bookshelf Server Binary
//!
//! Startup sequence:
//! ```text
//! load .env  →  parse ServerConfig (MONGOURI required)
//!   ↓
//! MongoBookStorage::connect (ping under the connect deadline)
//!   ↓
//! GraphQLServerBuilder → Axum on SERVER_HOST:SERVER_PORT
//! ```
//!
//! Any failure before the listener is up terminates the process.

use std::sync::Arc;

use anyhow::Context;
use bookshelf::{GraphQLServerBuilder, MongoBookStorage, ServerConfig};
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The .env file is optional; MONGOURI may come from the real environment
    let dotenv_result = dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = dotenv_result {
        warn!("Could not load .env file: {}", e);
    }

    let config = ServerConfig::parse();

    info!("Starting Bookshelf server...");
    info!("Server: {}", config.bind_address());

    let storage = MongoBookStorage::connect(&config)
        .await
        .context("failed to connect to MongoDB")?;

    GraphQLServerBuilder::new()
        .with_config(&config)
        .with_storage(Arc::new(storage))
        .build_and_run()
        .await
}
