//! JSON-RPC server with method dispatch.
//!
//! Reads framed requests off a transport, dispatches them to registered
//! method handlers, and writes the responses back. Handlers are plain async
//! functions; long-running work is scheduled by the handlers themselves and
//! observed through status polling, so dispatch stays sequential.

use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::jsonrpc::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::jsonrpc::transport::{Transport, TransportConfig};

/// Method handler function signature:
/// takes JSON parameters and returns a JSON result
pub type MethodHandler = Arc<
    dyn Fn(Option<serde_json::Value>) -> BoxFuture<'static, Result<serde_json::Value, JsonRpcError>>
        + Send
        + Sync,
>;

/// JSON-RPC server
pub struct JsonRpcServer {
    transport: Box<dyn Transport>,
    methods: Arc<Mutex<HashMap<String, MethodHandler>>>,
    running: Arc<Mutex<bool>>,
}

impl JsonRpcServer {
    /// Create a new JSON-RPC server with the specified transport
    pub async fn new(transport_config: TransportConfig) -> Result<Self> {
        let transport = transport_config.create_transport().await?;

        Ok(Self {
            transport,
            methods: Arc::new(Mutex::new(HashMap::new())),
            running: Arc::new(Mutex::new(false)),
        })
    }

    /// Register an async method handler with automatic error conversion
    pub async fn register_method<F, Fut, E>(&self, method_name: String, handler: F) -> Result<()>
    where
        F: Fn(Option<serde_json::Value>) -> Fut + Send + Sync + 'static + Clone,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>> + Send + 'static,
        E: Into<JsonRpcError> + Send + 'static,
    {
        let wrapped_handler: MethodHandler = Arc::new(move |params| {
            let handler_clone = handler.clone();
            Box::pin(async move { handler_clone(params).await.map_err(Into::into) })
        });

        let mut methods = self.methods.lock().await;
        methods.insert(method_name.clone(), wrapped_handler);

        debug!("Registered method: {}", method_name);
        Ok(())
    }

    /// Check if the server is running
    pub async fn is_running(&self) -> bool {
        *self.running.lock().await
    }

    /// Start the server and process requests until stopped
    pub async fn start(&mut self) -> Result<()> {
        {
            let mut running = self.running.lock().await;
            if *running {
                return Err(anyhow!("Server is already running"));
            }
            *running = true;
        }

        info!(
            "Starting JSON-RPC server with {} transport",
            self.transport.description()
        );

        while self.is_running().await {
            match self.handle_single_request().await {
                Ok(true) => {}
                Ok(false) => {
                    info!("Client disconnected; stopping server loop");
                    break;
                }
                Err(e) => {
                    // Keep serving other requests even if one fails
                    error!("Error handling request: {}", e);
                }
            }
        }

        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Stop the server
    pub async fn stop(&mut self) -> Result<()> {
        {
            let mut running = self.running.lock().await;
            *running = false;
        }

        self.transport.close().await?;
        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Handle a single JSON-RPC request.
    /// Returns `Ok(false)` when the peer has gone away and the loop should end.
    async fn handle_single_request(&mut self) -> Result<bool> {
        let request = match self.transport.read_request().await {
            Ok(req) => req,
            Err(e) if e.to_string().contains("Connection closed") => {
                return Ok(false);
            }
            Err(e) => {
                error!("Failed to read request: {}", e);
                let response = JsonRpcResponse::parse_error();
                if let Err(write_err) = self.transport.write_response(response).await {
                    error!("Failed to send error response: {}", write_err);
                }
                return Ok(true);
            }
        };

        debug!(
            "Received request: method={}, id={:?}",
            request.method, request.id
        );

        let response = self.process_request(request).await;

        // Notifications produce no response
        if let Some(response) = response {
            if let Err(e) = self.transport.write_response(response).await {
                error!("Failed to send response: {}", e);
            }
        }

        Ok(true)
    }

    /// Process a JSON-RPC request and return a response (if one is due)
    async fn process_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let request_id = request.id.clone();
        let is_notification = request.is_notification();

        if let Err(error) = request.validate() {
            if is_notification {
                warn!("Invalid notification: {}", error.message);
                return None;
            }
            return Some(JsonRpcResponse::error(error, request_id));
        }

        let handler = {
            let methods = self.methods.lock().await;
            methods.get(&request.method).cloned()
        };

        let Some(handler) = handler else {
            if is_notification {
                warn!("Method not found for notification: {}", request.method);
                return None;
            }
            return Some(JsonRpcResponse::method_not_found(
                &request.method,
                request_id,
            ));
        };

        match handler(request.params).await {
            Ok(result) => {
                if is_notification {
                    None
                } else {
                    Some(JsonRpcResponse::success(result, request_id))
                }
            }
            Err(error) => {
                if is_notification {
                    error!(
                        "Error in notification handler for {}: {}",
                        request.method, error.message
                    );
                    None
                } else {
                    Some(JsonRpcResponse::error(error, request_id))
                }
            }
        }
    }

    /// Get the list of registered methods
    pub async fn registered_methods(&self) -> Vec<String> {
        let methods = self.methods.lock().await;
        methods.keys().cloned().collect()
    }
}
