//! Transport layer for JSON-RPC communication.
//!
//! Implements LSP-style message framing with Content-Length headers over
//! stdio and Unix domain sockets.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, trace};

use crate::jsonrpc::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send {
    /// Read a JSON-RPC request from the transport
    async fn read_request(&mut self) -> Result<JsonRpcRequest>;

    /// Write a JSON-RPC response to the transport
    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()>;

    /// Write a JSON-RPC notification to the transport (server-to-client)
    async fn write_notification(&mut self, notification: JsonRpcNotification) -> Result<()>;

    /// Close the transport connection
    async fn close(&mut self) -> Result<()>;

    /// Get transport description for logging
    fn description(&self) -> &'static str;
}

/// Read an LSP-style message from any buffered reader
async fn read_lsp_message<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut content_length = None;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Err(anyhow!("Connection closed"));
        }

        let line = line.trim_end();

        // Empty line indicates end of headers
        if line.is_empty() {
            break;
        }

        if let Some(length_str) = line.strip_prefix("Content-Length: ") {
            content_length = Some(length_str.parse::<usize>()?);
        }

        trace!("Received header: {}", line);
    }

    let content_length = content_length.ok_or_else(|| anyhow!("Missing Content-Length header"))?;

    let mut buffer = vec![0u8; content_length];
    reader.read_exact(&mut buffer).await?;

    let content = String::from_utf8(buffer)?;
    debug!("Received message: {} bytes", content_length);

    Ok(content)
}

/// Write an LSP-style message to any writer
async fn write_lsp_message<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    content: &str,
) -> Result<()> {
    let content_bytes = content.as_bytes();

    writer
        .write_all(format!("Content-Length: {}\r\n\r\n", content_bytes.len()).as_bytes())
        .await?;
    writer.write_all(content_bytes).await?;
    writer.flush().await?;

    debug!("Sent message: {} bytes", content_bytes.len());
    Ok(())
}

/// Stdio transport using LSP-style Content-Length headers
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: tokio::io::Stdout,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn read_request(&mut self) -> Result<JsonRpcRequest> {
        let content = read_lsp_message(&mut self.reader).await?;
        let request: JsonRpcRequest = serde_json::from_str(&content)?;
        request
            .validate()
            .map_err(|e| anyhow!("Invalid request: {}", e.message))?;
        Ok(request)
    }

    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let content = serde_json::to_string(&response)?;
        write_lsp_message(&mut self.writer, &content).await
    }

    async fn write_notification(&mut self, notification: JsonRpcNotification) -> Result<()> {
        let content = serde_json::to_string(&notification)?;
        write_lsp_message(&mut self.writer, &content).await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush().await?;
        debug!("Stdio transport closed");
        Ok(())
    }

    fn description(&self) -> &'static str {
        "JSON-RPC over stdin/stdout (LSP-style)"
    }
}

/// Unix domain socket transport for a single accepted connection
pub struct IpcTransport {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
}

impl IpcTransport {
    /// Connect to an existing socket (client side)
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let stream = tokio::net::UnixStream::connect(path.as_ref()).await?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an accepted connection (server side)
    pub fn from_stream(stream: tokio::net::UnixStream) -> Self {
        let (read_half, write_half) = stream.into_split();

        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

#[async_trait]
impl Transport for IpcTransport {
    async fn read_request(&mut self) -> Result<JsonRpcRequest> {
        let content = read_lsp_message(&mut self.reader).await?;
        let request: JsonRpcRequest = serde_json::from_str(&content)?;
        request
            .validate()
            .map_err(|e| anyhow!("Invalid request: {}", e.message))?;
        Ok(request)
    }

    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let content = serde_json::to_string(&response)?;
        write_lsp_message(&mut self.writer, &content).await
    }

    async fn write_notification(&mut self, notification: JsonRpcNotification) -> Result<()> {
        let content = serde_json::to_string(&notification)?;
        write_lsp_message(&mut self.writer, &content).await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        debug!("IPC transport closed");
        Ok(())
    }

    fn description(&self) -> &'static str {
        "JSON-RPC over Unix domain socket (LSP-style)"
    }
}

/// Unix domain socket server transport.
///
/// Wraps a UnixListener and serves connections one at a time; a dropped
/// connection puts the transport back into accepting mode.
pub struct IpcServerTransport {
    listener: tokio::net::UnixListener,
    socket_path: String,
    current_connection: Option<IpcTransport>,
}

impl IpcServerTransport {
    /// Bind to a Unix socket path and start listening
    pub async fn bind<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let socket_path = path_ref.to_string_lossy().to_string();

        // Remove a stale socket file from a previous run
        if path_ref.exists() {
            std::fs::remove_file(path_ref)
                .map_err(|e| anyhow!("Failed to remove existing socket file: {}", e))?;
        }

        let listener = tokio::net::UnixListener::bind(path_ref)
            .map_err(|e| anyhow!("Failed to bind to socket {}: {}", socket_path, e))?;

        debug!("IPC server listening on: {}", socket_path);

        Ok(Self {
            listener,
            socket_path,
            current_connection: None,
        })
    }

    async fn ensure_connection(&mut self) -> Result<&mut IpcTransport> {
        if self.current_connection.is_none() {
            debug!("Waiting for client connection on {}", self.socket_path);
            let (stream, _addr) = self
                .listener
                .accept()
                .await
                .map_err(|e| anyhow!("Failed to accept connection: {}", e))?;
            debug!("Client connected to {}", self.socket_path);
            self.current_connection = Some(IpcTransport::from_stream(stream));
        }

        self.current_connection
            .as_mut()
            .ok_or_else(|| anyhow!("No active connection"))
    }
}

#[async_trait]
impl Transport for IpcServerTransport {
    async fn read_request(&mut self) -> Result<JsonRpcRequest> {
        loop {
            let transport = self.ensure_connection().await?;

            match transport.read_request().await {
                Ok(request) => return Ok(request),
                Err(e) => {
                    // Connection closed or broken: go back to accepting
                    debug!("Connection error (will accept new connection): {}", e);
                    self.current_connection = None;
                }
            }
        }
    }

    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let transport = self
            .current_connection
            .as_mut()
            .ok_or_else(|| anyhow!("No active connection"))?;
        transport.write_response(response).await
    }

    async fn write_notification(&mut self, notification: JsonRpcNotification) -> Result<()> {
        let transport = self
            .current_connection
            .as_mut()
            .ok_or_else(|| anyhow!("No active connection"))?;
        transport.write_notification(notification).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(ref mut transport) = self.current_connection {
            transport.close().await?;
        }

        if Path::new(&self.socket_path).exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        debug!("IPC server transport closed: {}", self.socket_path);
        Ok(())
    }

    fn description(&self) -> &'static str {
        "JSON-RPC server over Unix domain socket (LSP-style)"
    }
}

/// Transport configuration
#[derive(Debug, Clone)]
pub enum TransportConfig {
    /// Standard input/output with LSP message framing
    Stdio,
    /// Unix domain socket with specified path
    UnixSocket { path: String },
}

impl TransportConfig {
    /// Create a server-side transport from configuration
    pub async fn create_transport(&self) -> Result<Box<dyn Transport>> {
        match self {
            TransportConfig::Stdio => Ok(Box::new(StdioTransport::new())),
            TransportConfig::UnixSocket { path } => {
                let transport = IpcServerTransport::bind(path).await?;
                Ok(Box::new(transport))
            }
        }
    }

    /// Create transport configuration from server settings
    pub fn from_settings(settings: &crate::config::ServerSettings) -> Result<Self> {
        match settings.server.transport.as_str() {
            "stdio" => Ok(TransportConfig::Stdio),
            "socket" => {
                let path = settings
                    .server
                    .socket_path
                    .clone()
                    .ok_or_else(|| anyhow!("Socket path is required when using socket transport"))?;
                Ok(TransportConfig::UnixSocket { path })
            }
            other => Err(anyhow!("Unsupported transport type: {}", other)),
        }
    }

    /// Get transport description
    pub fn description(&self) -> String {
        match self {
            TransportConfig::Stdio => "stdin/stdout".to_string(),
            TransportConfig::UnixSocket { path } => format!("Unix socket ({})", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_description() {
        let config = TransportConfig::Stdio;
        assert_eq!(config.description(), "stdin/stdout");

        let config = TransportConfig::UnixSocket {
            path: "/tmp/siteforge.sock".to_string(),
        };
        assert!(config.description().contains("/tmp/siteforge.sock"));
    }

    #[test]
    fn test_transport_config_from_settings() {
        let mut settings = crate::config::ServerSettings::default();
        assert!(matches!(
            TransportConfig::from_settings(&settings).unwrap(),
            TransportConfig::Stdio
        ));

        settings.server.transport = "socket".to_string();
        settings.server.socket_path = Some("/tmp/test.sock".to_string());
        assert!(matches!(
            TransportConfig::from_settings(&settings).unwrap(),
            TransportConfig::UnixSocket { .. }
        ));

        settings.server.transport = "http".to_string();
        assert!(TransportConfig::from_settings(&settings).is_err());
    }

    #[tokio::test]
    async fn test_ipc_request_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let socket_path = tmp.path().join("rpc.sock");

        let mut server = IpcServerTransport::bind(&socket_path).await.unwrap();

        let client_path = socket_path.clone();
        let client = tokio::spawn(async move {
            let mut stream = tokio::net::UnixStream::connect(&client_path).await.unwrap();
            let body = serde_json::to_string(&JsonRpcRequest::new(
                "siteforge/status".to_string(),
                Some(serde_json::json!({"generation_id": "abc123"})),
                Some(serde_json::json!(7)),
            ))
            .unwrap();
            let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
            stream.write_all(framed.as_bytes()).await.unwrap();
            stream.flush().await.unwrap();
            // Keep the connection open until the server has read the frame
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        });

        let request = server.read_request().await.unwrap();
        assert_eq!(request.method, "siteforge/status");
        assert_eq!(request.id, Some(serde_json::json!(7)));

        client.await.unwrap();
    }
}
