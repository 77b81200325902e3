// file: src/parser/mod.rs
// description: markdown parsing module exports
// reference: internal module structure

pub mod dialect;
pub mod frontmatter;
pub mod normalizer;

pub use dialect::{DialectChecker, DialectWarning, Unsupported};
pub use frontmatter::{Frontmatter, FrontmatterParser};
pub use normalizer::{MarkdownNormalizer, content_hash};
