//! offcache server entry point.
//!
//! This is the main binary that boots the offline cache controller and
//! serves it as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offcache_client::{FetchClient, FetchConfig};
use offcache_core::{AppConfig, CacheDb, Controller, ControllerSettings};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        generation = %config.generation,
        scope = %config.scope_url,
        db_path = %config.db_path.display(),
        "Starting offcache server on stdio transport"
    );

    let db = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from_app_config(&config)?)?);
    let settings = ControllerSettings::from_config(&config)?;
    let controller = Arc::new(Controller::new(settings, db, network, Arc::new(host::LoggingHost)));

    let handler = handler::OffcacheServer::new(controller.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    controller.settle_refreshes().await;

    Ok(())
}
