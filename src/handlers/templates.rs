use serde::{Deserialize, Serialize};

use crate::ForgeResult;

/// A starter template advertised by the siteforge/templates endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub preview: String,
    pub styles: Vec<String>,
}

/// Handler for the siteforge/templates endpoint
pub struct TemplatesHandler;

impl TemplatesHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self) -> ForgeResult<Vec<SiteTemplate>> {
        Ok(catalog())
    }
}

impl Default for TemplatesHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Static catalog of starter templates
fn catalog() -> Vec<SiteTemplate> {
    vec![
        SiteTemplate {
            id: "modern-business".to_string(),
            name: "Modern Business".to_string(),
            description: "Corporate site with a responsive layout".to_string(),
            category: "business".to_string(),
            preview: "/static/templates/business-preview.jpg".to_string(),
            styles: vec!["modern".to_string(), "professional".to_string()],
        },
        SiteTemplate {
            id: "portfolio-creative".to_string(),
            name: "Creative Portfolio".to_string(),
            description: "Portfolio for designers and photographers".to_string(),
            category: "portfolio".to_string(),
            preview: "/static/templates/portfolio-preview.jpg".to_string(),
            styles: vec!["creative".to_string(), "minimal".to_string()],
        },
        SiteTemplate {
            id: "ecommerce-minimal".to_string(),
            name: "Online Store".to_string(),
            description: "Minimalist storefront with a shopping cart".to_string(),
            category: "ecommerce".to_string(),
            preview: "/static/templates/ecommerce-preview.jpg".to_string(),
            styles: vec!["minimal".to_string(), "modern".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_entries_have_known_styles() {
        let templates = TemplatesHandler::new().handle().await.unwrap();

        assert_eq!(templates.len(), 3);
        for template in templates {
            assert!(!template.id.is_empty());
            assert!(!template.styles.is_empty());
        }
    }
}
