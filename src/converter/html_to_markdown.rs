// file: src/converter/html_to_markdown.rs
// description: renders platform html fragments back to the supported markdown dialect
// reference: staged substitution pipeline over compiled regex patterns

use super::escape::decode_entities;
use super::patterns::{
    EXCESS_NEWLINES, HTML_ANY_TAG, HTML_EM, HTML_HEADING, HTML_LINE_BREAK, HTML_LIST_GAP,
    HTML_LIST_ITEM, HTML_LIST_WRAPPER, HTML_PARAGRAPH_BOUNDARY, HTML_PARAGRAPH_TAG, HTML_STRONG,
};
use regex::Captures;

/// HTML → Markdown renderer, the approximate inverse of
/// [`MarkdownToHtml`](super::MarkdownToHtml).
///
/// Blockquotes, links, images and code blocks are not inverted; their tags are
/// stripped with the rest of the unsupported markup and only text survives.
pub struct HtmlToMarkdown;

impl HtmlToMarkdown {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, html: &str) -> String {
        let mut markdown = html.replace("\r\n", "\n");

        markdown = self.render_headings(&markdown);
        markdown = self.render_emphasis(&markdown);
        markdown = self.render_lists(&markdown);
        markdown = self.render_breaks(&markdown);
        markdown = self.strip_tags(&markdown);

        self.normalize_whitespace(&markdown)
    }

    fn render_headings(&self, html: &str) -> String {
        HTML_HEADING
            .replace_all(html, |caps: &Captures| {
                let level: usize = caps[1].parse().unwrap_or(1);
                format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
            })
            .into_owned()
    }

    fn render_emphasis(&self, html: &str) -> String {
        let strong = HTML_STRONG.replace_all(html, "**$1**");
        HTML_EM.replace_all(&strong, "*$1*").into_owned()
    }

    fn render_lists(&self, html: &str) -> String {
        // Pretty-printed lists carry newlines between items that would
        // otherwise split one list into several.
        let tight = HTML_LIST_GAP.replace_all(html, "$1$2");
        let items = HTML_LIST_ITEM.replace_all(&tight, |caps: &Captures| {
            format!("- {}\n", caps[1].trim())
        });
        HTML_LIST_WRAPPER.replace_all(&items, "\n\n").into_owned()
    }

    fn render_breaks(&self, html: &str) -> String {
        let breaks = HTML_LINE_BREAK.replace_all(html, "\n");
        let paragraphs = HTML_PARAGRAPH_BOUNDARY.replace_all(&breaks, "\n\n");
        HTML_PARAGRAPH_TAG.replace_all(&paragraphs, "").into_owned()
    }

    fn strip_tags(&self, html: &str) -> String {
        let stripped = HTML_ANY_TAG.replace_all(html, "");
        decode_entities(&stripped)
    }

    fn normalize_whitespace(&self, markdown: &str) -> String {
        EXCESS_NEWLINES
            .replace_all(markdown, "\n\n")
            .trim()
            .to_string()
    }
}

impl Default for HtmlToMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::MarkdownToHtml;
    use pretty_assertions::assert_eq;

    fn render(html: &str) -> String {
        HtmlToMarkdown::new().render(html)
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("<h1>One</h1>"), "# One");
        assert_eq!(render("<h2 name=\"x\" id=\"y\">Two</h2>"), "## Two");
        assert_eq!(render("<h3>Three</h3><p>body</p>"), "### Three\n\nbody");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            render("<p><strong>bold</strong> and <em>em</em></p>"),
            "**bold** and *em*"
        );
        assert_eq!(render("<p><b>b</b> <i>i</i></p>"), "**b** *i*");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(render("<ul><li>a</li><li>b</li></ul>"), "- a\n- b");
    }

    #[test]
    fn test_pretty_printed_list_stays_grouped() {
        let markdown = render("<p>Items:</p>\n<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n<p>after</p>");

        assert_eq!(markdown, "Items:\n\n- a\n- b\n\nafter");
        assert_eq!(
            MarkdownToHtml::new().render(&markdown).matches("<ul>").count(),
            1
        );
    }

    #[test]
    fn test_breaks_and_paragraphs() {
        assert_eq!(render("<p>one<br>two<br/>three<br />four</p>"), "one\ntwo\nthree\nfour");
        assert_eq!(render("<p>one</p>\n<p>two</p>"), "one\n\ntwo");
    }

    #[test]
    fn test_unsupported_tags_are_stripped() {
        let markdown = render(
            r#"<blockquote>quote</blockquote><p><a href="https://x">link</a> <img src="a.png" alt="a"></p><pre><code>code</code></pre>"#,
        );

        assert_eq!(markdown, "quotelink code");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(render("<p>a &lt; b &amp;&amp; c</p>"), "a < b && c");
        assert_eq!(render("<p>&#12354;&#x3044;</p>"), "あい");
    }

    #[test]
    fn test_collapses_newlines_and_trims() {
        assert_eq!(render("\n\n<p>a</p>\n\n\n\n<p>b</p>\n"), "a\n\nb");
    }

    #[test]
    fn test_unbalanced_markup_degrades() {
        assert_eq!(render("<p>open <strong>never closed</p>"), "open never closed");
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_round_trip_supported_subset() {
        let to_html = MarkdownToHtml::new();
        let to_markdown = HtmlToMarkdown::new();
        let documents = [
            "# Title\n\nSome **bold** and *em*.\n\n- a\n- b",
            "## Section\n\nFirst paragraph\nwith a break.\n\nSecond paragraph.",
            "### Notes\n\n- one\n- *two*\n- **three**\n\nClosing words.",
            "Just a paragraph.",
            "Compare 1 < 2 and 3 > 2.",
            "Write &amp; to get an ampersand.",
            "Tags like <div> stay text & so does this.",
        ];

        for doc in documents {
            let round_trip = to_markdown.render(&to_html.render(doc));
            assert_eq!(round_trip, doc);
        }
    }
}
