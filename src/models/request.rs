use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

/// A single website-generation request. Created once per submission; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SiteRequest {
    #[validate(length(min = 1, max = 100, message = "Site name must be 1-100 characters"))]
    pub site_name: String,
    #[validate(length(min = 10, max = 1000, message = "Description must be 10-1000 characters"))]
    pub description: String,
    #[serde(default)]
    pub style: SiteStyle,
    #[serde(default)]
    pub theme: ColorTheme,
    #[serde(default = "default_devices")]
    #[validate(length(min = 1, message = "At least one target device is required"))]
    pub target_devices: Vec<TargetDevice>,
    #[serde(default = "default_true")]
    pub seo_enabled: bool,
    #[serde(default)]
    pub multi_language: bool,
    /// Image descriptors produced by the upstream image processor; bytes are
    /// never inspected here.
    #[serde(default)]
    pub images: Vec<ImageAsset>,
}

fn default_devices() -> Vec<TargetDevice> {
    vec![
        TargetDevice::Mobile,
        TargetDevice::Tablet,
        TargetDevice::Desktop,
    ]
}

fn default_true() -> bool {
    true
}

impl SiteRequest {
    /// Derived identifier grouping requests considered interchangeable for
    /// reuse. Theme, devices, and feature flags are deliberately excluded:
    /// two requests that agree on name, description, and style share a result.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.site_name.as_bytes());
        hasher.update(self.description.as_bytes());
        hasher.update(self.style.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(|img| img.url.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStyle {
    Modern,
    Classic,
    Minimal,
    Creative,
}

impl Default for SiteStyle {
    fn default() -> Self {
        SiteStyle::Modern
    }
}

impl SiteStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStyle::Modern => "modern",
            SiteStyle::Classic => "classic",
            SiteStyle::Minimal => "minimal",
            SiteStyle::Creative => "creative",
        }
    }
}

impl std::fmt::Display for SiteStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    Light,
    Dark,
    Auto,
}

impl Default for ColorTheme {
    fn default() -> Self {
        ColorTheme::Light
    }
}

impl ColorTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTheme::Light => "light",
            ColorTheme::Dark => "dark",
            ColorTheme::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDevice {
    Mobile,
    Tablet,
    Desktop,
}

impl TargetDevice {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetDevice::Mobile => "mobile",
            TargetDevice::Tablet => "tablet",
            TargetDevice::Desktop => "desktop",
        }
    }
}

impl std::fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pre-processed image descriptor handed over by the image-processing collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
}
