//! JSON-RPC 2.0 implementation for Siteforge.
//!
//! Provides a focused JSON-RPC 2.0 server supporting LSP-style message
//! framing over stdio and Unix sockets, plus the method registry wiring the
//! generation pipeline to the wire.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
pub use server::{JsonRpcServer, MethodHandler};
pub use transport::{IpcTransport, StdioTransport, Transport, TransportConfig};

use std::sync::Arc;

use crate::config::ServerSettings;
use crate::generator::GenerationOrchestrator;
use crate::handlers::{
    DownloadHandler, DownloadRequest, GenerateSiteHandler, HealthHandler, StatusHandler,
    StatusQuery, TemplatesHandler,
};
use crate::models::SiteRequest;

/// JSON-RPC method constants for Siteforge procedures
pub const GENERATE: &str = "siteforge/generate";
pub const STATUS: &str = "siteforge/status";
pub const DOWNLOAD: &str = "siteforge/download";
pub const HEALTH: &str = "siteforge/health";
pub const TEMPLATES: &str = "siteforge/templates";

/// All supported Siteforge JSON-RPC methods
pub const ALL_METHODS: &[&str] = &[GENERATE, STATUS, DOWNLOAD, HEALTH, TEMPLATES];

pub const JSONRPC_VERSION: &str = "2.0";

/// Create the Siteforge JSON-RPC server with all methods registered
pub async fn create_siteforge_server(
    settings: Arc<ServerSettings>,
    orchestrator: Arc<GenerationOrchestrator>,
) -> anyhow::Result<JsonRpcServer> {
    let transport_config = TransportConfig::from_settings(&settings)?;
    let server = JsonRpcServer::new(transport_config).await?;

    register_siteforge_methods(&server, settings, orchestrator).await?;

    Ok(server)
}

/// Register all Siteforge JSON-RPC methods with the server.
///
/// Methods accept their request types directly as params. For example,
/// `siteforge/generate` accepts:
/// ```json
/// {
///   "site_name": "Bakery",
///   "description": "A cozy neighborhood bakery site",
///   "style": "modern"
/// }
/// ```
pub async fn register_siteforge_methods(
    server: &JsonRpcServer,
    settings: Arc<ServerSettings>,
    orchestrator: Arc<GenerationOrchestrator>,
) -> anyhow::Result<()> {
    {
        let orchestrator = orchestrator.clone();
        server
            .register_method(GENERATE.to_string(), move |params| {
                let orchestrator = orchestrator.clone();
                async move {
                    let params_value = params.unwrap_or(serde_json::Value::Null);
                    let request: SiteRequest = serde_json::from_value(params_value.clone())
                        .map_err(|e| create_parse_error::<SiteRequest>(&e, &params_value))?;

                    let handler = GenerateSiteHandler::new(orchestrator);
                    let status = handler.handle(request).await.map_err(JsonRpcError::from)?;

                    serialize_result(status)
                }
            })
            .await?;
    }

    {
        let orchestrator = orchestrator.clone();
        server
            .register_method(STATUS.to_string(), move |params| {
                let orchestrator = orchestrator.clone();
                async move {
                    let params_value = params.unwrap_or(serde_json::Value::Null);
                    let query: StatusQuery = serde_json::from_value(params_value.clone())
                        .map_err(|e| create_parse_error::<StatusQuery>(&e, &params_value))?;

                    let handler = StatusHandler::new(orchestrator);
                    let status = handler.handle(query).await.map_err(JsonRpcError::from)?;

                    serialize_result(status)
                }
            })
            .await?;
    }

    {
        let orchestrator = orchestrator.clone();
        server
            .register_method(DOWNLOAD.to_string(), move |params| {
                let orchestrator = orchestrator.clone();
                async move {
                    let params_value = params.unwrap_or(serde_json::Value::Null);
                    let request: DownloadRequest = serde_json::from_value(params_value.clone())
                        .map_err(|e| create_parse_error::<DownloadRequest>(&e, &params_value))?;

                    let handler = DownloadHandler::new(orchestrator);
                    let payload = handler.handle(request).await.map_err(JsonRpcError::from)?;

                    serialize_result(payload)
                }
            })
            .await?;
    }

    {
        let health_handler = Arc::new(HealthHandler::new(settings));
        server
            .register_method(HEALTH.to_string(), move |_params| {
                let health_handler = health_handler.clone();
                async move {
                    let report = health_handler.handle().await.map_err(JsonRpcError::from)?;
                    serialize_result(report)
                }
            })
            .await?;
    }

    {
        server
            .register_method(TEMPLATES.to_string(), move |_params| async move {
                let catalog = TemplatesHandler::new()
                    .handle()
                    .await
                    .map_err(JsonRpcError::from)?;
                serialize_result(catalog)
            })
            .await?;
    }

    tracing::info!(
        "Registered {} Siteforge JSON-RPC methods",
        ALL_METHODS.len()
    );
    Ok(())
}

fn serialize_result<T: serde::Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        JsonRpcError::custom(
            protocol::error_codes::INTERNAL_ERROR,
            format!("Failed to serialize response: {}", e),
            None,
        )
    })
}

fn create_parse_error<T>(error: &serde_json::Error, params: &serde_json::Value) -> JsonRpcError {
    let type_name = std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("Request");

    let received_fields: Vec<&str> = match params {
        serde_json::Value::Object(map) => map.keys().map(|s| s.as_str()).collect(),
        _ => vec![],
    };

    let hint = if received_fields.is_empty() {
        "No parameters provided".to_string()
    } else {
        format!("Received fields: {}", received_fields.join(", "))
    };

    JsonRpcError::custom(
        protocol::error_codes::INVALID_PARAMS,
        format!("Invalid {}: {}. {}", type_name, error, hint),
        Some(serde_json::json!({
            "parse_error": error.to_string(),
            "received": params,
        })),
    )
}
