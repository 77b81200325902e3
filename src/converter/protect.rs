// file: src/converter/protect.rs
// description: extract/restore of fenced code regions behind opaque placeholders
// reference: staged substitution pipelines with protected spans

use super::escape::escape_text;
use super::patterns::MD_FENCED_CODE;

const MARKER: char = '\u{1A}';

/// Rendered code blocks pulled out of the text before any inline rule runs.
#[derive(Debug, Default)]
pub struct ProtectedBlocks {
    blocks: Vec<String>,
}

impl ProtectedBlocks {
    /// Replaces every fenced code region with a placeholder and keeps its
    /// rendered `<pre><code>` form aside. Unterminated fences are left alone.
    pub fn extract(markdown: &str) -> (String, Self) {
        let mut blocks = Vec::new();

        let text = MD_FENCED_CODE
            .replace_all(markdown, |caps: &regex::Captures| {
                let code = caps[1].strip_suffix('\n').unwrap_or(&caps[1]);
                blocks.push(format!("<pre><code>{}</code></pre>", escape_text(code)));
                format!("{}\n", Self::placeholder(blocks.len() - 1))
            })
            .into_owned();

        (text, Self { blocks })
    }

    pub fn restore(&self, text: &str) -> String {
        let mut restored = text.to_string();
        for (index, block) in self.blocks.iter().enumerate() {
            restored = restored.replace(&Self::placeholder(index), block);
        }
        restored
    }

    fn placeholder(index: usize) -> String {
        format!("{MARKER}CODE{index}{MARKER}")
    }
}
