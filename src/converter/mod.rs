// file: src/converter/mod.rs
// description: bidirectional markup converter module exports
// reference: internal module structure

pub mod escape;
pub mod html_to_markdown;
pub mod images;
pub mod markdown_to_html;
pub mod patterns;
pub mod protect;

pub use html_to_markdown::HtmlToMarkdown;
pub use images::{image_sources, resolve_image_sources};
pub use markdown_to_html::MarkdownToHtml;
pub use protect::ProtectedBlocks;
