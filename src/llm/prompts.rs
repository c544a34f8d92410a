use crate::models::SiteRequest;

/// Website-generation prompt templates for the chat-completion backend
pub struct PromptBuilder;

impl PromptBuilder {
    /// Generate system prompt establishing the generation contract
    pub fn system_prompt() -> String {
        r#"You are a senior frontend developer with 10+ years of experience. You build modern, responsive websites that work flawlessly on every device.

CRITICAL REQUIREMENTS:
1. Mobile-first approach
2. CSS Grid/Flexbox for responsive layout
3. Semantic HTML5 tags
4. Accessibility (ARIA attributes)
5. Performance-conscious output
6. SEO-friendly document structure

CSS REQUIREMENTS:
- Use CSS custom properties for colors
- Mobile-first media queries
- Flexbox/Grid for layout
- Smooth transitions
- Dark/light theme support
- Modern CSS (grid, custom properties)

MANDATORY SECTIONS:
- Header with navigation
- Hero section with a call to action
- Main content
- Footer with contact details

RETURN ONLY JSON WITH THE FOLLOWING STRUCTURE:
{
  "html": "complete HTML document",
  "css": "complete stylesheet",
  "js": "JavaScript code (optional)",
  "seo": {
    "title": "page title",
    "description": "meta description",
    "keywords": "comma-separated keywords"
  }
}

Do not add any explanatory text, only clean JSON."#
            .to_string()
    }

    /// Generate the user prompt for one site request
    pub fn generation_prompt(request: &SiteRequest) -> String {
        let devices_text = request
            .target_devices
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "BUILD A RESPONSIVE WEBSITE:\n\n\
             SITE NAME: {}\n\
             DESCRIPTION: {}\n\
             DESIGN STYLE: {}\n\
             COLOR THEME: {}\n\
             TARGET DEVICES: {}\n\
             SEO OPTIMIZATION: {}\n\
             MULTI-LANGUAGE: {}\n",
            request.site_name,
            request.description,
            request.style,
            request.theme,
            devices_text,
            if request.seo_enabled { "YES" } else { "NO" },
            if request.multi_language { "YES" } else { "NO" },
        );

        if !request.images.is_empty() {
            prompt.push_str("\nAVAILABLE IMAGES:\n");
            for (index, image) in request.images.iter().enumerate() {
                prompt.push_str(&format!(
                    "{}. {} ({}x{})\n",
                    index + 1,
                    image.url,
                    image.width,
                    image.height
                ));
            }
        }

        prompt.push_str(&format!(
            "\nTECHNICAL REQUIREMENTS:\n\
             - Mobile-first responsive design\n\
             - Breakpoints: 320px, 768px, 1024px, 1440px\n\
             - Semantic HTML5 markup\n\
             - CSS Grid/Flexbox layouts\n\
             - Accessible (ARIA labels)\n\
             - Fast loading performance\n\n\
             DESIGN REQUIREMENTS:\n\
             - Modern {} style\n\
             - {} color theme\n\
             - Professional typography\n\
             - Consistent spacing\n\
             - Interactive elements\n\n\
             INCLUDE THE FOLLOWING SECTIONS:\n\
             1. Header with logo and navigation\n\
             2. Hero section with the main headline\n\
             3. Features/About section\n\
             4. Contact/form section\n\
             5. Footer with social links\n\n\
             RETURN JSON WITH HTML, CSS AND SEO METADATA.",
            request.style, request.theme,
        ));

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorTheme, ImageAsset, SiteStyle, TargetDevice};

    fn bakery_request() -> SiteRequest {
        SiteRequest {
            site_name: "Bakery".to_string(),
            description: "A cozy neighborhood bakery site".to_string(),
            style: SiteStyle::Creative,
            theme: ColorTheme::Dark,
            target_devices: vec![TargetDevice::Mobile, TargetDevice::Desktop],
            seo_enabled: true,
            multi_language: false,
            images: vec![],
        }
    }

    #[test]
    fn test_system_prompt() {
        let prompt = PromptBuilder::system_prompt();
        assert!(prompt.contains("frontend developer"));
        assert!(prompt.contains("Mobile-first"));
        assert!(prompt.contains("only clean JSON"));
    }

    #[test]
    fn test_generation_prompt_embeds_request_fields() {
        let prompt = PromptBuilder::generation_prompt(&bakery_request());

        assert!(prompt.contains("SITE NAME: Bakery"));
        assert!(prompt.contains("A cozy neighborhood bakery site"));
        assert!(prompt.contains("DESIGN STYLE: creative"));
        assert!(prompt.contains("COLOR THEME: dark"));
        assert!(prompt.contains("mobile, desktop"));
        assert!(prompt.contains("SEO OPTIMIZATION: YES"));
        assert!(prompt.contains("MULTI-LANGUAGE: NO"));
    }

    #[test]
    fn test_generation_prompt_lists_images() {
        let mut request = bakery_request();
        request.images.push(ImageAsset {
            url: "/uploads/images/storefront.webp".to_string(),
            width: 1200,
            height: 800,
            byte_size: 48_213,
        });

        let prompt = PromptBuilder::generation_prompt(&request);
        assert!(prompt.contains("/uploads/images/storefront.webp"));
        assert!(prompt.contains("1200x800"));
    }

    #[test]
    fn test_generation_prompt_names_breakpoints() {
        let prompt = PromptBuilder::generation_prompt(&bakery_request());
        assert!(prompt.contains("320px, 768px, 1024px, 1440px"));
    }
}
