//! CLI command implementations.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

use crate::client::ConnectionState;
use crate::config::ServerSettings;
use crate::server::{start_server, TransportConfig};

use super::utils::{load_request_params, load_server_settings, print_notification};

/// Start the Siteforge JSON-RPC server
pub async fn serve(
    transport_type: String,
    socket_path: Option<String>,
    config_path: Option<PathBuf>,
    config_json: Option<String>,
) -> Result<()> {
    info!("Starting Siteforge server with {} transport", transport_type);
    info!("Loading configuration...");

    let settings = load_server_settings(config_path, config_json)?;
    settings.validate()?;

    let transport_config = match transport_type.as_str() {
        "stdio" => TransportConfig::Stdio,
        "socket" => TransportConfig::UnixSocket {
            path: socket_path
                .or(settings.server.socket_path.clone())
                .unwrap_or_else(|| "/tmp/siteforge.sock".to_string()),
        },
        _ => anyhow::bail!("Invalid transport type: {}", transport_type),
    };

    info!(
        "Initializing Siteforge JSON-RPC server with transport: {:?}",
        transport_config
    );

    start_server(std::sync::Arc::new(settings), Some(transport_config)).await?;

    info!("Siteforge server stopped");
    Ok(())
}

/// Connect to a Siteforge server via Unix socket
pub async fn connect(socket_path: String) -> Result<()> {
    use crate::client::JsonRpcClient;

    info!("Connecting to Siteforge server at: {}", socket_path);

    let path = std::path::Path::new(&socket_path);
    if !path.exists() {
        anyhow::bail!("Socket path does not exist: {}", socket_path);
    }

    let client = JsonRpcClient::new(socket_path.clone());
    if !client.validate_connection().await? {
        anyhow::bail!("Failed to connect to server at: {}", socket_path);
    }

    ConnectionState::save(&socket_path)?;

    println!("✓ Connected to Siteforge server at: {}", socket_path);
    println!("  Connection saved. Use 'siteforge health' to check the server.");
    println!("  Use 'siteforge disconnect' to disconnect.");

    Ok(())
}

/// Disconnect from the current Siteforge server
pub async fn disconnect() -> Result<()> {
    if !ConnectionState::is_connected()? {
        println!("Not currently connected to any server.");
        return Ok(());
    }

    let socket_path = ConnectionState::load()?.unwrap_or_default();
    ConnectionState::clear()?;

    println!("✓ Disconnected from: {}", socket_path);

    Ok(())
}

/// Submit a website-generation request
pub async fn generate(
    params_file: Option<PathBuf>,
    params_json: Option<String>,
) -> Result<()> {
    let params = load_request_params(params_file, params_json, "generate")?;
    let client = ConnectionState::get_client()?;

    info!("Sending generate request to: {}", client.socket_path());

    let result = client
        .generate(params, |notification| {
            print_notification(&notification);
        })
        .await?;

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}

/// Query generation status
pub async fn status(generation_id: String) -> Result<()> {
    let client = ConnectionState::get_client()?;

    info!(
        "Querying status of {} via: {}",
        generation_id,
        client.socket_path()
    );

    let result = client.status(&generation_id).await?;

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}

/// Download a finished generation
pub async fn download(generation_id: String, format: String) -> Result<()> {
    match format.as_str() {
        "zip" | "raw" => {}
        other => anyhow::bail!("Invalid download format: {} (expected 'zip' or 'raw')", other),
    }

    let client = ConnectionState::get_client()?;

    info!(
        "Requesting {} download of {} via: {}",
        format,
        generation_id,
        client.socket_path()
    );

    let result = client.download(&generation_id, &format).await?;

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}

/// Report server health
pub async fn health() -> Result<()> {
    let client = ConnectionState::get_client()?;

    let result = client.health().await?;

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}

/// Initialize default configuration
pub async fn init(force: bool) -> Result<()> {
    let config_path = ServerSettings::config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let settings = ServerSettings::default();
    let toml_content = toml::to_string_pretty(&settings)?;
    std::fs::write(&config_path, toml_content)?;

    println!("✓ Configuration initialized at {:?}", config_path);
    Ok(())
}

/// Manage configuration (show, validate, edit)
pub async fn config(show: bool, validate: bool, edit: bool) -> Result<()> {
    if show {
        let settings = ServerSettings::load()?;
        let toml_content = toml::to_string_pretty(&settings)?;
        println!("{}", toml_content);
    }

    if validate {
        match ServerSettings::load() {
            Ok(settings) => match settings.validate() {
                Ok(()) => println!("✓ Configuration is valid"),
                Err(e) => error!("Configuration validation failed: {}", e),
            },
            Err(e) => error!("Failed to load configuration: {}", e),
        }
    }

    if edit {
        let config_path = ServerSettings::config_path();
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
        std::process::Command::new(editor)
            .arg(&config_path)
            .status()?;
    }

    Ok(())
}

/// Show version information
pub async fn version() -> Result<()> {
    println!("Siteforge {}", env!("CARGO_PKG_VERSION"));
    println!("Built with Rust {}", rustc_version::version()?);
    Ok(())
}
