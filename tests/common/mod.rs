//! Shared fixtures for integration tests: a scriptable completion backend and
//! an orchestrator wired against temporary storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use siteforge::archive::SiteArchiver;
use siteforge::generator::GenerationOrchestrator;
use siteforge::llm::CompletionBackend;
use siteforge::models::{GenerationStatus, SeoMeta, SiteDraft, SiteRequest};
use siteforge::store::{ResultCache, StatusStore};
use siteforge::{ForgeError, ForgeResult};

/// Backend double that counts invocations and can be made slow or failing
pub struct FakeBackend {
    pub calls: Arc<AtomicUsize>,
    draft: SiteDraft,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl FakeBackend {
    pub fn returning(draft: SiteDraft) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            draft,
            delay: None,
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            draft: SiteDraft::default(),
            delay: None,
            failure: Some(message.to_string()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn generate_site(&self, _request: &SiteRequest) -> ForgeResult<SiteDraft> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(ForgeError::upstream(message.clone(), None));
        }

        Ok(self.draft.clone())
    }
}

/// Minimal draft a model might return: a bare page with a single image
pub fn bakery_draft() -> SiteDraft {
    SiteDraft {
        html: "<html><head><title>Bakery</title></head><body><img src=x></body></html>"
            .to_string(),
        css: String::new(),
        js: String::new(),
        seo: SeoMeta {
            title: "Bakery".to_string(),
            description: String::new(),
            keywords: String::new(),
        },
    }
}

pub fn bakery_request() -> SiteRequest {
    serde_json::from_str(
        r#"{"site_name":"Bakery","description":"A cozy neighborhood bakery site"}"#,
    )
    .expect("request literal must parse")
}

/// Orchestrator over temporary storage; the TempDir must outlive the test
pub fn test_orchestrator(backend: Arc<FakeBackend>) -> (GenerationOrchestrator, TempDir) {
    let tmp = TempDir::new().expect("temp dir");
    let orchestrator = GenerationOrchestrator::new(
        backend,
        StatusStore::new(3600),
        ResultCache::new(16, 86_400),
        SiteArchiver::new(tmp.path().join("sites"), tmp.path().join("zips")),
    );
    (orchestrator, tmp)
}

/// Poll until the generation reaches a terminal state
pub async fn wait_for_terminal(
    orchestrator: &GenerationOrchestrator,
    generation_id: &str,
) -> GenerationStatus {
    for _ in 0..500 {
        if let Ok(status) = orchestrator.status(generation_id).await {
            if status.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation {} never reached a terminal state", generation_id);
}
