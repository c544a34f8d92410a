//! Server assembly: builds the pipeline dependencies, registers the JSON-RPC
//! methods, and runs the request loop.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::archive::SiteArchiver;
use crate::config::ServerSettings;
use crate::generator::GenerationOrchestrator;
use crate::jsonrpc::create_siteforge_server;
use crate::llm::OpenAiClient;
use crate::store::{ResultCache, StatusStore};

/// Transport selection for the server
#[derive(Debug, Clone)]
pub enum TransportConfig {
    /// Standard input/output transport
    Stdio,
    /// Unix domain socket transport
    UnixSocket { path: String },
}

/// How often expired status entries are swept out of memory
const STATUS_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Create and start the Siteforge JSON-RPC server with the specified configuration
pub async fn start_server(
    settings: Arc<ServerSettings>,
    transport_config: Option<TransportConfig>,
) -> Result<()> {
    info!("Starting Siteforge JSON-RPC server");

    // An explicitly requested transport overrides the configured one
    let mut settings_copy = (*settings).clone();
    match transport_config {
        Some(TransportConfig::Stdio) => {
            settings_copy.server.transport = "stdio".to_string();
            settings_copy.server.socket_path = None;
        }
        Some(TransportConfig::UnixSocket { path }) => {
            settings_copy.server.transport = "socket".to_string();
            settings_copy.server.socket_path = Some(path);
        }
        None => {}
    }
    let settings = Arc::new(settings_copy);
    settings.validate()?;

    let backend = OpenAiClient::new(&settings.llm)?;
    let statuses = StatusStore::new(settings.cache.status_ttl_secs);
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        Arc::new(backend),
        statuses.clone(),
        ResultCache::new(settings.cache.capacity, settings.cache.result_ttl_secs),
        SiteArchiver::new(
            settings.storage.sites_dir.clone(),
            settings.storage.archives_dir.clone(),
        ),
    ));

    // Periodic sweep keeps the status store bounded; entries also expire
    // lazily on read, so this is memory hygiene rather than correctness.
    let sweep_store = statuses.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATUS_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sweep_store.sweep().await;
            if removed > 0 {
                debug!("Status sweep removed {} entries", removed);
            }
        }
    });

    let mut server = create_siteforge_server(settings.clone(), orchestrator).await?;

    info!("Siteforge server ready");
    server.start().await?;

    error!("Server loop exited");
    Ok(())
}

/// Start server with stdio transport (convenience function)
pub async fn start_stdio_server(settings: Arc<ServerSettings>) -> Result<()> {
    start_server(settings, Some(TransportConfig::Stdio)).await
}

/// Start server with Unix socket transport (convenience function)
pub async fn start_unix_socket_server(
    settings: Arc<ServerSettings>,
    socket_path: String,
) -> Result<()> {
    start_server(settings, Some(TransportConfig::UnixSocket { path: socket_path })).await
}
