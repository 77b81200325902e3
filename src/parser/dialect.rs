// file: src/parser/dialect.rs
// description: detects markdown constructs outside the supported sync dialect
// reference: https://docs.rs/pulldown-cmark

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::fmt;

/// Constructs that render lossily (or not at all) through the sync pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unsupported {
    Table,
    NestedList,
    OrderedList,
    TaskList,
    Footnote,
    InlineHtml,
    DeepHeading,
    Strikethrough,
    ReferenceLink,
    IndentedCode,
}

impl Unsupported {
    pub fn describe(&self) -> &'static str {
        match self {
            Unsupported::Table => "tables are not supported",
            Unsupported::NestedList => "nested lists are flattened",
            Unsupported::OrderedList => "ordered lists are not supported",
            Unsupported::TaskList => "task list markers are not supported",
            Unsupported::Footnote => "footnotes are not supported",
            Unsupported::InlineHtml => "inline HTML is not supported",
            Unsupported::DeepHeading => "only heading levels 1-3 are supported",
            Unsupported::Strikethrough => "strikethrough is not supported",
            Unsupported::ReferenceLink => "reference-style links are not supported",
            Unsupported::IndentedCode => "indented code blocks are not supported, use fences",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectWarning {
    pub kind: Unsupported,
    pub line: usize,
}

impl fmt::Display for DialectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind.describe())
    }
}

pub struct DialectChecker;

impl DialectChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, content: &str) -> Vec<DialectWarning> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(content, options).into_offset_iter();

        let mut warnings = Vec::new();
        let mut list_depth = 0usize;

        for (event, range) in parser {
            let kind = match event {
                Event::Start(Tag::Table(_)) => Some(Unsupported::Table),
                Event::Start(Tag::List(start)) => {
                    list_depth += 1;
                    if list_depth > 1 {
                        Some(Unsupported::NestedList)
                    } else if start.is_some() {
                        Some(Unsupported::OrderedList)
                    } else {
                        None
                    }
                }
                Event::End(TagEnd::List(_)) => {
                    list_depth = list_depth.saturating_sub(1);
                    None
                }
                Event::TaskListMarker(_) => Some(Unsupported::TaskList),
                Event::Start(Tag::FootnoteDefinition(_)) | Event::FootnoteReference(_) => {
                    Some(Unsupported::Footnote)
                }
                Event::Html(_) | Event::InlineHtml(_) => Some(Unsupported::InlineHtml),
                Event::Start(Tag::Heading { level, .. }) if level as u32 > 3 => {
                    Some(Unsupported::DeepHeading)
                }
                Event::Start(Tag::Strikethrough) => Some(Unsupported::Strikethrough),
                Event::Start(Tag::Link { link_type, .. }) => match link_type {
                    LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut => {
                        Some(Unsupported::ReferenceLink)
                    }
                    _ => None,
                },
                Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                    Some(Unsupported::IndentedCode)
                }
                _ => None,
            };

            if let Some(kind) = kind {
                warnings.push(DialectWarning {
                    kind,
                    line: line_of(content, range.start),
                });
            }
        }

        warnings
    }
}

impl Default for DialectChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(content: &str) -> Vec<Unsupported> {
        DialectChecker::new()
            .check(content)
            .into_iter()
            .map(|w| w.kind)
            .collect()
    }

    #[test]
    fn test_supported_dialect_is_clean() {
        let content = "# Title\n\nSome **bold** and *em*.\n\n- a\n- b\n\n> quote\n\n[link](https://x)\n\n![img](a.png)\n\n```rust\nfn main() {}\n```\n";

        assert!(kinds(content).is_empty());
    }

    #[test]
    fn test_table_detected() {
        let content = "| a | b |\n|---|---|\n| 1 | 2 |\n";

        assert_eq!(kinds(content), vec![Unsupported::Table]);
    }

    #[test]
    fn test_nested_and_ordered_lists() {
        let content = "1. one\n2. two\n\n- outer\n  - inner\n";
        let found = kinds(content);

        assert!(found.contains(&Unsupported::OrderedList));
        assert!(found.contains(&Unsupported::NestedList));
    }

    #[test]
    fn test_footnote_and_deep_heading() {
        let content = "#### Deep\n\nText[^1]\n\n[^1]: note\n";
        let found = kinds(content);

        assert!(found.contains(&Unsupported::DeepHeading));
        assert!(found.contains(&Unsupported::Footnote));
    }

    #[test]
    fn test_warning_line_numbers() {
        let content = "fine\n\n<div>raw</div>\n";
        let warnings = DialectChecker::new().check(content);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 3);
        assert_eq!(warnings[0].to_string(), "line 3: inline HTML is not supported");
    }
}
