//! CLI helpers: configuration and parameter loading, notification printing.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::config::ServerSettings;
use crate::jsonrpc::JsonRpcNotification;

/// Load server settings from a TOML file, inline JSON, or environment defaults
pub fn load_server_settings(
    config_path: Option<PathBuf>,
    config_json: Option<String>,
) -> Result<ServerSettings> {
    if let Some(json) = config_json {
        debug!("Loading configuration from inline JSON");
        let settings: ServerSettings =
            serde_json::from_str(&json).map_err(|e| anyhow!("Invalid inline JSON config: {}", e))?;
        return Ok(settings);
    }

    let path = config_path.unwrap_or_else(ServerSettings::config_path);
    if path.exists() {
        debug!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;
        let settings: ServerSettings =
            toml::from_str(&content).map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        return Ok(settings);
    }

    debug!("No configuration file found; using defaults with environment overrides");
    ServerSettings::load()
}

/// Load request parameters from a file or inline JSON string
pub fn load_request_params(
    params_file: Option<PathBuf>,
    params_json: Option<String>,
    method: &str,
) -> Result<Value> {
    let raw = match (params_file, params_json) {
        (Some(path), None) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read params file {:?}: {}", path, e))?,
        (None, Some(json)) => json,
        (None, None) => {
            return Err(anyhow!(
                "Provide parameters for '{}' via --params-file or --params-json",
                method
            ))
        }
        (Some(_), Some(_)) => {
            return Err(anyhow!("--params-file and --params-json are mutually exclusive"))
        }
    };

    serde_json::from_str(&raw).map_err(|e| anyhow!("Invalid request parameters: {}", e))
}

/// Print a server notification to the terminal
pub fn print_notification(notification: &JsonRpcNotification) {
    match &notification.params {
        Some(params) => println!("[{}] {}", notification.method, params),
        None => println!("[{}]", notification.method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_request_params_from_inline_json() {
        let params = load_request_params(
            None,
            Some(r#"{"site_name":"Bakery"}"#.to_string()),
            "generate",
        )
        .unwrap();

        assert_eq!(params["site_name"], "Bakery");
    }

    #[test]
    fn test_load_request_params_requires_a_source() {
        assert!(load_request_params(None, None, "generate").is_err());
    }

    #[test]
    fn test_load_request_params_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("params.json");
        std::fs::write(&path, r#"{"generation_id":"abc123"}"#).unwrap();

        let params = load_request_params(Some(path), None, "status").unwrap();
        assert_eq!(params["generation_id"], "abc123");
    }

    #[test]
    fn test_load_server_settings_falls_back_to_defaults() {
        let settings = load_server_settings(Some(PathBuf::from("/nonexistent/config.toml")), None)
            .unwrap();
        assert_eq!(settings.server.transport, "stdio");
    }
}
