use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::generator::GenerationOrchestrator;
use crate::models::GenerationStatus;
use crate::{ForgeError, ForgeResult};

/// Request type for the siteforge/status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusQuery {
    #[validate(length(min = 1, message = "Generation ID cannot be empty"))]
    pub generation_id: String,
}

/// Handler for the siteforge/status endpoint
pub struct StatusHandler {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl StatusHandler {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, query: StatusQuery) -> ForgeResult<GenerationStatus> {
        query
            .validate()
            .map_err(|e| ForgeError::validation(format!("{}", e)))?;

        debug!("Status query for generation {}", query.generation_id);
        self.orchestrator.status(&query.generation_id).await
    }
}
