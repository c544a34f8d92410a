use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerSettings;
use crate::ForgeResult;

/// Health report returned by the siteforge/health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub services: ServiceReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    pub llm: String,
    pub storage: String,
}

/// Handler for the siteforge/health endpoint
pub struct HealthHandler {
    settings: Arc<ServerSettings>,
    started_at: Instant,
}

impl HealthHandler {
    pub fn new(settings: Arc<ServerSettings>) -> Self {
        Self {
            settings,
            started_at: Instant::now(),
        }
    }

    pub async fn handle(&self) -> ForgeResult<HealthReport> {
        let llm = if std::env::var(&self.settings.llm.api_key_env).is_ok() {
            "configured"
        } else {
            "not_configured"
        };

        let storage = match tokio::fs::create_dir_all(&self.settings.storage.sites_dir).await {
            Ok(()) => "writable",
            Err(_) => "unavailable",
        };

        Ok(HealthReport {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            services: ServiceReport {
                llm: llm.to_string(),
                storage: storage.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_report_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = ServerSettings::default();
        settings.storage.sites_dir = tmp.path().join("sites");

        let handler = HealthHandler::new(Arc::new(settings));
        let report = handler.handle().await.unwrap();

        assert_eq!(report.status, "healthy");
        assert_eq!(report.services.storage, "writable");
        assert!(!report.version.is_empty());
    }
}
