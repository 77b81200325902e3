// file: src/parser/normalizer.rs
// description: markdown normalization for hashing and dialect canonicalization
// reference: CommonMark line endings and frontmatter conventions

use crate::parser::frontmatter::FrontmatterParser;
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref TRAILING_WHITESPACE: Regex = Regex::new(
        r"(?m)[ \t]+$"
    ).expect("TRAILING_WHITESPACE regex is valid");

    static ref BLANK_RUNS: Regex = Regex::new(
        r"\n{3,}"
    ).expect("BLANK_RUNS regex is valid");
}

/// SHA-256 of the raw text, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct MarkdownNormalizer;

impl MarkdownNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Reduces a document to the text that matters for change detection:
    /// no frontmatter, LF line endings, no trailing whitespace, no runs of
    /// blank lines, trimmed.
    pub fn normalize(&self, content: &str) -> String {
        let mut normalized = self.strip_frontmatter(&self.normalize_line_breaks(content));
        normalized = TRAILING_WHITESPACE.replace_all(&normalized, "").into_owned();
        normalized = BLANK_RUNS.replace_all(&normalized, "\n\n").into_owned();
        normalized.trim().to_string()
    }

    /// Hash of the normalized text; two documents that differ only in
    /// whitespace or frontmatter share a fingerprint.
    pub fn fingerprint(&self, content: &str) -> String {
        content_hash(&self.normalize(content))
    }

    /// Rewrites near-miss syntax into the supported dialect before rendering:
    /// `*`/`+` bullets become `- `, heading markers get a single space.
    /// Fenced code is left exactly as written.
    pub fn canonicalize(&self, content: &str) -> String {
        let normalized = self.normalize_line_breaks(content);
        let mut result = Vec::new();
        let mut in_code_block = false;

        for line in normalized.split('\n') {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                result.push(line.to_string());
                continue;
            }

            if in_code_block {
                result.push(line.to_string());
                continue;
            }

            let line = self.canonicalize_heading(line);
            result.push(self.canonicalize_list_item(&line));
        }

        result.join("\n")
    }

    /// Drops a leading frontmatter block; a block with unreadable YAML is
    /// kept as body text.
    pub fn strip_frontmatter(&self, content: &str) -> String {
        FrontmatterParser::new()
            .split(content)
            .map(|(_, body)| body)
            .unwrap_or_else(|_| content.to_string())
    }

    fn canonicalize_heading(&self, line: &str) -> String {
        if !line.starts_with('#') {
            return line.to_string();
        }

        let level = line.chars().take_while(|&c| c == '#').count();
        let rest = &line[level..];

        if level <= 3 && rest.starts_with([' ', '\t']) && !rest.trim().is_empty() {
            format!("{} {}", "#".repeat(level), rest.trim())
        } else {
            line.to_string()
        }
    }

    fn canonicalize_list_item(&self, line: &str) -> String {
        if let Some(stripped) = line
            .strip_prefix("* ")
            .or_else(|| line.strip_prefix("+ "))
            .or_else(|| line.strip_prefix("- "))
        {
            format!("- {}", stripped.trim())
        } else {
            line.to_string()
        }
    }

    fn normalize_line_breaks(&self, content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_whitespace() {
        let normalizer = MarkdownNormalizer::new();
        let content = "Line 1   \r\n\r\n\r\n\r\nLine 2\t\n";

        assert_eq!(normalizer.normalize(content), "Line 1\n\nLine 2");
    }

    #[test]
    fn test_normalize_drops_frontmatter() {
        let normalizer = MarkdownNormalizer::new();
        let content = "---\ntitle: x\n---\n\n# Body";

        assert_eq!(normalizer.normalize(content), "# Body");
    }

    #[test]
    fn test_fingerprint_ignores_cosmetic_changes() {
        let normalizer = MarkdownNormalizer::new();
        let a = "---\nupdated_at: \"1\"\n---\n# T\n\nbody\n";
        let b = "---\nupdated_at: \"2\"\n---\n# T\n\n\n\nbody   \n\n";

        assert_eq!(normalizer.fingerprint(a), normalizer.fingerprint(b));
        assert_ne!(normalizer.fingerprint(a), normalizer.fingerprint("# T\n\nother"));
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash("abc");

        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_canonicalize_lists_and_headings() {
        let normalizer = MarkdownNormalizer::new();
        let content = "##   Subtitle  \n* Item 1\n+ Item 2\n- Item 3\n#hashtag";

        assert_eq!(
            normalizer.canonicalize(content),
            "## Subtitle\n- Item 1\n- Item 2\n- Item 3\n#hashtag"
        );
    }

    #[test]
    fn test_canonicalize_leaves_code_alone() {
        let normalizer = MarkdownNormalizer::new();
        let content = "```\n* keep\n#   keep\n```\n* fix";

        assert_eq!(
            normalizer.canonicalize(content),
            "```\n* keep\n#   keep\n```\n- fix"
        );
    }

    #[test]
    fn test_strip_frontmatter() {
        let normalizer = MarkdownNormalizer::new();

        assert_eq!(normalizer.strip_frontmatter("---\na: b\n---\nbody"), "body");
        assert_eq!(normalizer.strip_frontmatter("body"), "body");
    }

    #[test]
    fn test_normalize_drops_edge_case_frontmatter() {
        let normalizer = MarkdownNormalizer::new();

        assert_eq!(normalizer.normalize("---\n---\nbody"), "body");
        assert_eq!(normalizer.normalize("---\ntitle: x\n---"), "");
        assert_eq!(normalizer.normalize("---\r\ntitle: x\r\n---\r\nbody"), "body");
    }
}
