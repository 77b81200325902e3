// file: src/parser/frontmatter.rs
// description: YAML frontmatter split and render for article markdown
// reference: https://docs.rs/yaml-rust

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;
use yaml_rust::{Yaml, YamlLoader};

lazy_static! {
    static ref FRONTMATTER_BLOCK: Regex = Regex::new(
        r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)"
    ).expect("FRONTMATTER_BLOCK regex is valid");
}

pub struct FrontmatterParser;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub fields: BTreeMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self
    }

    /// Splits a leading `---` block off the document. A document without one
    /// yields empty frontmatter and the whole input as body.
    pub fn split(&self, content: &str) -> Result<(Frontmatter, String)> {
        let Some(caps) = FRONTMATTER_BLOCK.captures(content) else {
            return Ok((Frontmatter::default(), content.to_string()));
        };

        let yaml_content = caps.get(1).map_or("", |m| m.as_str());
        let body = content[caps[0].len()..]
            .trim_start_matches(['\r', '\n'])
            .to_string();

        let docs = YamlLoader::load_from_str(yaml_content)
            .map_err(|e| PipelineError::Frontmatter(format!("YAML parse error: {}", e)))?;

        let mut frontmatter = Frontmatter::default();

        if let Some(Yaml::Hash(hash)) = docs.first() {
            for (key, value) in hash {
                let Yaml::String(k) = key else {
                    continue;
                };
                match Self::scalar(value) {
                    Some(v) => frontmatter.insert(k.clone(), v),
                    None => debug!("Skipping non-scalar frontmatter field: {}", k),
                }
            }
        }

        Ok((frontmatter, body))
    }

    /// Renders frontmatter back in front of a body. Values are emitted as
    /// double-quoted YAML strings.
    pub fn render(&self, frontmatter: &Frontmatter, body: &str) -> String {
        if frontmatter.is_empty() {
            return body.to_string();
        }

        let mut output = String::from("---\n");
        for (key, value) in &frontmatter.fields {
            let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value));
            output.push_str(&format!("{}: {}\n", key, quoted));
        }
        output.push_str("---\n\n");
        output.push_str(body);
        output
    }

    fn scalar(value: &Yaml) -> Option<String> {
        match value {
            Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Boolean(b) => Some(b.to_string()),
            Yaml::Null => Some(String::new()),
            _ => None,
        }
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}
