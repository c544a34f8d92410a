//! Deterministic post-processing of LLM-produced markup and styles.
//!
//! Both entry points are pure string transformations: they cannot fail, they
//! degrade gracefully on absent or malformed input, and re-running them on
//! already-normalized output changes nothing. Every insertion is guarded by a
//! presence test rather than performed blindly.

const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// Marker comment used as the presence test for the base stylesheet
pub const BASE_STYLESHEET_MARKER: &str = "/* siteforge base responsive styles */";

/// Mobile-first baseline prepended ahead of every generated stylesheet.
/// LLM-supplied rules follow it in source order, so they win through normal
/// cascade precedence.
pub const BASE_STYLESHEET: &str = r#"/* siteforge base responsive styles */
:root {
    --primary-color: #3b6ea5;
    --secondary-color: #77216f;
    --text-color: #2c2c2c;
    --bg-color: #ffffff;
    --mobile: 320px;
    --tablet: 768px;
    --desktop: 1024px;
    --large: 1440px;
}

@media (prefers-color-scheme: dark) {
    :root {
        --text-color: #e8e8e8;
        --bg-color: #161616;
    }
}

* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

html {
    font-size: 16px;
    scroll-behavior: smooth;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
    line-height: 1.6;
    color: var(--text-color);
    background-color: var(--bg-color);
    min-height: 100vh;
}

img {
    max-width: 100%;
    height: auto;
}

/* Mobile-first media queries */
@media (min-width: 768px) {
    html { font-size: 17px; }
}

@media (min-width: 1024px) {
    html { font-size: 18px; }
}

/* Accessibility */
@media (prefers-reduced-motion: reduce) {
    * { animation-duration: 0.01ms !important; }
}
"#;

/// Inject responsive-design boilerplate into an HTML document.
///
/// Three independent, presence-guarded fixes: a viewport meta tag ahead of the
/// closing head tag, `loading="lazy"` on image tags that lack a loading
/// attribute, and a `<main>` wrapper around the body contents when no such
/// landmark exists.
pub fn normalize_html(html: &str) -> String {
    let mut output = html.to_string();

    if !output.to_ascii_lowercase().contains("viewport") {
        if let Some(pos) = find_ignore_case(&output, "</head>") {
            output.insert_str(pos, &format!("{}\n", VIEWPORT_META));
        }
    }

    output = lazy_load_images(&output);

    if !output.to_ascii_lowercase().contains("<main") {
        output = wrap_body_in_main(&output);
    }

    output
}

/// Prepend the base stylesheet ahead of the LLM-supplied rules.
///
/// Unconditional concatenation, not a merge; the marker comment keeps the
/// operation idempotent. Empty input yields just the base sheet.
pub fn normalize_css(css: &str) -> String {
    if css.contains(BASE_STYLESHEET_MARKER) {
        return css.to_string();
    }

    if css.is_empty() {
        BASE_STYLESHEET.to_string()
    } else {
        format!("{}\n{}", BASE_STYLESHEET, css)
    }
}

/// Case-insensitive substring search returning the byte offset in `haystack`.
/// ASCII lowercasing keeps byte offsets identical between the two strings.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Add `loading="lazy"` to every `<img` tag that does not already declare a
/// loading attribute.
fn lazy_load_images(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut output = String::with_capacity(html.len() + 64);
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find("<img") {
        let start = cursor + rel;
        let after_tag_name = start + "<img".len();

        // Skip lookalikes such as a hypothetical <imgx> element
        let is_img_tag = lower[after_tag_name..]
            .chars()
            .next()
            .map(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
            .unwrap_or(false);

        let tag_end = lower[start..]
            .find('>')
            .map(|i| start + i)
            .unwrap_or(lower.len());

        output.push_str(&html[cursor..start]);

        let tag = &html[start..tag_end];
        if is_img_tag && !tag.to_ascii_lowercase().contains("loading") {
            output.push_str("<img loading=\"lazy\"");
            output.push_str(&html[after_tag_name..tag_end]);
        } else {
            output.push_str(tag);
        }

        cursor = tag_end;
    }

    output.push_str(&html[cursor..]);
    output
}

/// Wrap the body contents in a `<main>` landmark. Documents without a body
/// tag are returned unchanged.
fn wrap_body_in_main(html: &str) -> String {
    let lower = html.to_ascii_lowercase();

    let Some(body_open) = lower.find("<body") else {
        return html.to_string();
    };
    let Some(open_end) = lower[body_open..].find('>').map(|i| body_open + i + 1) else {
        return html.to_string();
    };

    let close = lower.rfind("</body>").unwrap_or(html.len());
    if close < open_end {
        return html.to_string();
    }

    format!(
        "{}\n    <main>{}    </main>\n{}",
        &html[..open_end],
        &html[open_end..close],
        &html[close..]
    )
}
