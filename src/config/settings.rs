use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server-wide configuration loaded from config.toml or environment variables
/// This controls the Siteforge server itself (NOT individual generation requests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub transport: String,
    pub socket_path: Option<String>,
    pub log_level: String,
}

/// Connection parameters for the upstream chat-completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout applied at the HTTP client level, in seconds
    pub timeout: u64,
    /// Environment variable holding the API credential
    pub api_key_env: String,
}

/// Filesystem layout for generated output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub sites_dir: PathBuf,
    pub archives_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a finished generation stays reusable for identical requests
    pub result_ttl_secs: u64,
    /// Seconds a status record survives without being refreshed
    pub status_ttl_secs: u64,
    /// Maximum number of cached generation results held in memory
    pub capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                transport: "stdio".to_string(),
                socket_path: Some("/tmp/siteforge.sock".to_string()),
                log_level: "info".to_string(),
            },
            llm: LlmConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4.1-nano".to_string(),
                temperature: 0.7,
                max_tokens: 4000,
                timeout: 300,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            storage: StorageConfig {
                sites_dir: PathBuf::from("generated/sites"),
                archives_dir: PathBuf::from("generated/zips"),
            },
            cache: CacheConfig {
                result_ttl_secs: 86_400, // 24 hours
                status_ttl_secs: 3_600,  // 1 hour
                capacity: 256,
            },
        }
    }
}

impl ServerSettings {
    pub fn load() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(val) = std::env::var("SITEFORGE_LOG_LEVEL") {
            settings.server.log_level = val;
        }

        if let Ok(val) = std::env::var("SITEFORGE_TRANSPORT") {
            settings.server.transport = val;
        }

        if let Ok(val) = std::env::var("SITEFORGE_SOCKET_PATH") {
            settings.server.socket_path = Some(val);
        }

        if let Ok(val) = std::env::var("SITEFORGE_LLM_ENDPOINT") {
            settings.llm.endpoint = val;
        }

        if let Ok(val) = std::env::var("SITEFORGE_LLM_MODEL") {
            settings.llm.model = val;
        }

        if let Ok(val) = std::env::var("SITEFORGE_SITES_DIR") {
            settings.storage.sites_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("SITEFORGE_ARCHIVES_DIR") {
            settings.storage.archives_dir = PathBuf::from(val);
        }

        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        if let Ok(custom_path) = std::env::var("SITEFORGE_CONFIG_PATH") {
            PathBuf::from(custom_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("siteforge")
                .join("config.toml")
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.server.transport.as_str() {
            "stdio" => {}
            "socket" => {
                let path = self.server.socket_path.as_deref().unwrap_or("");
                if path.is_empty() {
                    anyhow::bail!("Socket path is required when using socket transport");
                }
            }
            other => anyhow::bail!("Unsupported transport type: {}", other),
        }

        if self.llm.endpoint.is_empty() {
            anyhow::bail!("LLM endpoint must not be empty");
        }

        if self.llm.max_tokens == 0 {
            anyhow::bail!("LLM max_tokens must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("LLM temperature must be between 0.0 and 2.0");
        }

        if self.cache.capacity == 0 {
            anyhow::bail!("Cache capacity must be greater than 0");
        }

        Ok(())
    }
}
