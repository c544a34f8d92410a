use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::generator::{DownloadFormat, DownloadPayload, GenerationOrchestrator};
use crate::{ForgeError, ForgeResult};

/// Request type for the siteforge/download endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DownloadRequest {
    #[validate(length(min = 1, message = "Generation ID cannot be empty"))]
    pub generation_id: String,
    #[serde(default)]
    pub format: DownloadFormat,
}

/// Handler for the siteforge/download endpoint.
/// Resolves a generation to its ZIP bundle or raw entry page on disk; the
/// serving layer streams the actual bytes.
pub struct DownloadHandler {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl DownloadHandler {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, request: DownloadRequest) -> ForgeResult<DownloadPayload> {
        request
            .validate()
            .map_err(|e| ForgeError::validation(format!("{}", e)))?;

        debug!(
            "Download request for generation {} as {:?}",
            request.generation_id, request.format
        );

        self.orchestrator
            .download(&request.generation_id, request.format)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults_to_zip() {
        let request: DownloadRequest =
            serde_json::from_str(r#"{"generation_id":"abc123"}"#).unwrap();
        assert_eq!(request.format, DownloadFormat::Zip);
    }

    #[test]
    fn test_raw_format_parses() {
        let request: DownloadRequest =
            serde_json::from_str(r#"{"generation_id":"abc123","format":"raw"}"#).unwrap();
        assert_eq!(request.format, DownloadFormat::Raw);
    }
}
