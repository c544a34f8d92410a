//! Siteforge Generation Server
//!
//! A standalone server orchestrating LLM-powered responsive website generation.
//! Provides LSP-style JSON-RPC communication for front-end and CLI clients.

pub mod archive;
pub mod cli;
pub mod client;
pub mod config;
pub mod generator;
pub mod handlers;
pub mod jsonrpc;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod server;
pub mod store;

/// Application-wide error types with context preservation
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Upstream generation error: {message}")]
    Upstream { message: String, context: Option<String> },

    #[error("Persistence error: {message}")]
    Persistence { message: String, path: Option<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl ForgeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an upstream error with optional context
    pub fn upstream(message: impl Into<String>, context: Option<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            context,
        }
    }

    /// Create a persistence error with optional path
    pub fn persistence(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            path,
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get error code for JSON-RPC responses
    pub fn error_code(&self) -> i32 {
        match self {
            ForgeError::Configuration { .. } => -32014,
            ForgeError::Validation { .. } => -32602,
            ForgeError::Upstream { .. } => -32010,
            ForgeError::Persistence { .. } => -32012,
            ForgeError::NotFound(_) => -32004,
            ForgeError::Transport { .. } => -32001,
            ForgeError::Internal(_) => -32603,
            ForgeError::Io { .. } => -32603,
            ForgeError::Serialization { .. } => -32700,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ForgeError::Configuration { message } => {
                format!("Configuration issue: {}", message)
            }
            ForgeError::Validation { message } => {
                format!("Invalid request: {}", message)
            }
            ForgeError::Upstream { message, context } => {
                if let Some(ctx) = context {
                    format!("Generation backend error ({}): {}", ctx, message)
                } else {
                    format!("Generation backend error: {}", message)
                }
            }
            ForgeError::Persistence { message, path } => {
                if let Some(p) = path {
                    format!("Storage error ({}): {}", p, message)
                } else {
                    format!("Storage error: {}", message)
                }
            }
            ForgeError::NotFound(what) => {
                format!("Not found: {}", what)
            }
            ForgeError::Transport { message } => {
                format!("Communication error: {}", message)
            }
            ForgeError::Internal(message) => {
                format!("Internal error: {}", message)
            }
            ForgeError::Io { source } => {
                format!("File system error: {}", source)
            }
            ForgeError::Serialization { source } => {
                format!("Data format error: {}", source)
            }
        }
    }
}

/// Convenience type alias for Results
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn with_upstream_context(self, context: &str) -> ForgeResult<T>;
    fn with_storage_context(self, path: &str) -> ForgeResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn with_upstream_context(self, context: &str) -> ForgeResult<T> {
        self.map_err(|e| {
            ForgeError::upstream(
                format!("Operation failed: {}", e.into()),
                Some(context.to_string()),
            )
        })
    }

    fn with_storage_context(self, path: &str) -> ForgeResult<T> {
        self.map_err(|e| {
            ForgeError::persistence(
                format!("Operation failed: {}", e.into()),
                Some(path.to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ForgeError::configuration("Invalid config");
        assert_eq!(err.error_code(), -32014);
        assert!(err.user_message().contains("Configuration issue"));
    }

    #[test]
    fn test_not_found_error() {
        let err = ForgeError::not_found("generation abc123");
        assert_eq!(err.error_code(), -32004);
        assert!(err.user_message().contains("abc123"));
    }

    #[test]
    fn test_upstream_error_with_context() {
        let err = ForgeError::upstream("connection refused", Some("chat completion".to_string()));
        assert_eq!(err.error_code(), -32010);
        assert!(err.user_message().contains("chat completion"));
    }

    #[test]
    fn test_result_extension() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));

        let forge_result = result.with_storage_context("/tmp/sites");
        assert!(forge_result.is_err());

        if let Err(ForgeError::Persistence { path, .. }) = forge_result {
            assert_eq!(path, Some("/tmp/sites".to_string()));
        } else {
            panic!("Expected Persistence error");
        }
    }
}
