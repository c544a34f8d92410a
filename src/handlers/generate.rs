use std::sync::Arc;
use tracing::info;

use crate::generator::GenerationOrchestrator;
use crate::models::{GenerationStatus, SiteRequest};
use crate::ForgeResult;

/// Handler for the siteforge/generate endpoint.
/// Validates the request, consults the cache, and schedules the background
/// generation through the orchestrator.
pub struct GenerateSiteHandler {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl GenerateSiteHandler {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Submit one generation request; returns the initial status immediately.
    /// Validation failures surface here synchronously, before any work is
    /// scheduled.
    pub async fn handle(&self, request: SiteRequest) -> ForgeResult<GenerationStatus> {
        info!(
            "Processing generate request for site '{}' ({} images)",
            request.site_name,
            request.images.len()
        );

        let status = self.orchestrator.submit(request).await?;

        info!(
            "Generation {} accepted in state {}",
            status.generation_id, status.status
        );

        Ok(status)
    }
}
