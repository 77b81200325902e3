// file: src/converter/markdown_to_html.rs
// description: renders the supported markdown dialect to an html fragment
// reference: staged substitution pipeline over compiled regex patterns

use super::escape::{escape_text, quote_attribute};
use super::patterns::{
    BR_AFTER_BLOCK, BR_BEFORE_BLOCK, EMPTY_PARAGRAPH, MD_BLANK_LINES, MD_BLOCKQUOTE, MD_BOLD,
    MD_HEADING, MD_IMAGE, MD_ITALIC, MD_LINK, MD_LIST_ITEM, MD_LIST_RUN, P_AFTER_BLOCK,
    P_BEFORE_BLOCK,
};
use super::protect::ProtectedBlocks;
use regex::Captures;

/// Markdown → HTML renderer.
///
/// Every stage is a pure `&str -> String` rewrite and the stages always run in
/// the same order, so rule interactions are deterministic. Unmatched syntax is
/// passed through literally; rendering never fails.
pub struct MarkdownToHtml;

impl MarkdownToHtml {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, markdown: &str) -> String {
        let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
        if normalized.trim().is_empty() {
            return String::new();
        }

        let (text, protected) = ProtectedBlocks::extract(&normalized);
        // Escaped before any stage adds markup, so literal text survives pull.
        let mut html = escape_text(&text);

        html = self.render_headings(&html);
        html = self.render_emphasis(&html);
        html = self.render_lists(&html);
        html = self.render_links(&html);
        html = self.render_images(&html);
        html = self.render_blockquotes(&html);
        html = self.render_paragraphs(&html);
        html = protected.restore(&html);

        self.cleanup(&html)
    }

    fn render_headings(&self, text: &str) -> String {
        MD_HEADING
            .replace_all(text, |caps: &Captures| {
                let level = caps[1].len();
                format!("<h{level}>{}</h{level}>", &caps[2])
            })
            .into_owned()
    }

    fn render_emphasis(&self, text: &str) -> String {
        let bold = MD_BOLD.replace_all(text, "<strong>$1</strong>");
        MD_ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
    }

    fn render_lists(&self, text: &str) -> String {
        let items = MD_LIST_ITEM.replace_all(text, "<li>$1</li>");
        MD_LIST_RUN
            .replace_all(&items, |caps: &Captures| {
                format!("<ul>{}</ul>", caps[0].replace('\n', ""))
            })
            .into_owned()
    }

    fn render_links(&self, text: &str) -> String {
        MD_LINK
            .replace_all(text, |caps: &Captures| {
                if &caps[1] == "!" {
                    return caps[0].to_string();
                }
                format!(
                    r#"<a href="{}">{}</a>"#,
                    quote_attribute(&caps[3]),
                    &caps[2]
                )
            })
            .into_owned()
    }

    fn render_images(&self, text: &str) -> String {
        MD_IMAGE
            .replace_all(text, |caps: &Captures| {
                format!(
                    r#"<img src="{}" alt="{}">"#,
                    quote_attribute(&caps[2]),
                    quote_attribute(&caps[1])
                )
            })
            .into_owned()
    }

    fn render_blockquotes(&self, text: &str) -> String {
        MD_BLOCKQUOTE
            .replace_all(text, "<blockquote>$1</blockquote>")
            .into_owned()
    }

    fn render_paragraphs(&self, text: &str) -> String {
        let paragraphs = MD_BLANK_LINES.replace_all(text.trim(), "</p><p>");
        format!("<p>{}</p>", paragraphs.replace('\n', "<br>"))
    }

    /// Strips paragraph artifacts around block elements. Runs until nothing
    /// changes, so applying it to its own output is a no-op.
    pub fn cleanup(&self, html: &str) -> String {
        let mut current = html.to_string();
        loop {
            let next = Self::cleanup_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn cleanup_pass(html: &str) -> String {
        let html = BR_BEFORE_BLOCK.replace_all(html, "</p><p>$1");
        let html = BR_AFTER_BLOCK.replace_all(&html, "$1</p><p>");
        let html = P_BEFORE_BLOCK.replace_all(&html, "$1");
        let html = P_AFTER_BLOCK.replace_all(&html, "$1");
        EMPTY_PARAGRAPH.replace_all(&html, "").into_owned()
    }
}

impl Default for MarkdownToHtml {
    fn default() -> Self {
        Self::new()
    }
}
