// file: src/repository/mod.rs
// description: local article checkout operations module exports
// reference: Internal module structure

pub mod scaffold;
pub mod scanner;

pub use scaffold::{ArticleScaffold, ScaffoldedArticle};
pub use scanner::{ArticleScanner, ScannedArticle};
