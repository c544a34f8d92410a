use serde::{Deserialize, Serialize};

use super::SiteRequest;

/// SEO metadata returned by the generation backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
}

/// The JSON-shaped reply expected from the chat-completion endpoint.
/// Unknown keys are ignored; missing keys degrade to empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteDraft {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
    #[serde(default)]
    pub seo: SeoMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Outcome of a single generation attempt. Immutable once constructed and
/// written exactly once to persistent storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: ResultStatus,
    pub generation_id: String,
    pub site_name: String,
    pub html_content: String,
    pub css_content: String,
    pub js_content: String,
    pub seo_meta: SeoMeta,
    pub images_used: Vec<String>,
    /// Wall-clock seconds spent producing this result
    pub generation_time: f64,
    pub error_message: String,
}

impl GenerationResult {
    pub fn success(
        generation_id: impl Into<String>,
        request: &SiteRequest,
        html_content: String,
        css_content: String,
        js_content: String,
        seo_meta: SeoMeta,
        generation_time: f64,
    ) -> Self {
        Self {
            status: ResultStatus::Success,
            generation_id: generation_id.into(),
            site_name: request.site_name.clone(),
            html_content,
            css_content,
            js_content,
            seo_meta,
            images_used: request.image_urls(),
            generation_time,
            error_message: String::new(),
        }
    }

    pub fn failure(
        generation_id: impl Into<String>,
        error_message: impl Into<String>,
        generation_time: f64,
    ) -> Self {
        Self {
            status: ResultStatus::Error,
            generation_id: generation_id.into(),
            site_name: String::new(),
            html_content: String::new(),
            css_content: String::new(),
            js_content: String::new(),
            seo_meta: SeoMeta::default(),
            images_used: vec![],
            generation_time,
            error_message: error_message.into(),
        }
    }
}

/// Sidecar written next to the generated assets as `meta.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub generation_id: String,
    pub site_name: String,
    pub created_at: String,
    pub generation_time: f64,
    pub seo_meta: SeoMeta,
    pub images_used: Vec<String>,
}

impl SiteMetadata {
    pub fn from_result(result: &GenerationResult) -> Self {
        Self {
            generation_id: result.generation_id.clone(),
            site_name: result.site_name.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            generation_time: result.generation_time,
            seo_meta: result.seo_meta.clone(),
            images_used: result.images_used.clone(),
        }
    }
}
