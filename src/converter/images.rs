// file: src/converter/images.rs
// description: resolves repository-relative image sources to absolute asset urls
// reference: post-render html rewriting with compiled patterns

use super::patterns::HTML_IMG_SRC;
use regex::Captures;

/// Rewrites relative `<img src>` values so the platform can load assets that
/// live next to the article in the repository. Absolute, protocol-relative and
/// `data:` sources are left as they are.
pub fn resolve_image_sources(html: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');

    HTML_IMG_SRC
        .replace_all(html, |caps: &Captures| {
            let src = &caps[2];
            if is_absolute(src) || src.is_empty() {
                return caps[0].to_string();
            }
            let relative = src.trim_start_matches("./").trim_start_matches('/');
            format!("{}{}/{}{}", &caps[1], base, relative, &caps[3])
        })
        .into_owned()
}

/// Collects every `<img src>` value in document order.
pub fn image_sources(html: &str) -> Vec<String> {
    HTML_IMG_SRC
        .captures_iter(html)
        .map(|caps| caps[2].to_string())
        .collect()
}

fn is_absolute(src: &str) -> bool {
    src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("//")
        || src.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_sources_are_resolved() {
        let html = r#"<p><img src="assets/a.png" alt="a"></p>"#;
        let resolved = resolve_image_sources(html, "https://cdn.example.com/articles/demo/");

        assert_eq!(
            resolved,
            r#"<p><img src="https://cdn.example.com/articles/demo/assets/a.png" alt="a"></p>"#
        );
    }

    #[test]
    fn test_absolute_sources_are_untouched() {
        let html = r#"<img src="https://x.dev/a.png" alt=""><img src="data:image/png;base64,AA" alt="">"#;

        assert_eq!(resolve_image_sources(html, "https://cdn"), html);
    }

    #[test]
    fn test_dot_slash_prefix() {
        let resolved = resolve_image_sources(r#"<img src="./b.png" alt="b">"#, "https://cdn");

        assert_eq!(resolved, r#"<img src="https://cdn/b.png" alt="b">"#);
    }

    #[test]
    fn test_image_sources_in_order() {
        let html = r#"<img src="one.png" alt=""><p>x</p><img src="two.png" alt="">"#;

        assert_eq!(image_sources(html), vec!["one.png", "two.png"]);
    }
}
