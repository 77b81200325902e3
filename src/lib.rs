// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod converter;
pub mod error;
pub mod models;
pub mod parser;
pub mod remote;
pub mod repository;
pub mod sync;
pub mod utils;

pub use config::{Config, PlatformConfig, RepositoryConfig, SyncConfig};
pub use converter::{HtmlToMarkdown, MarkdownToHtml};
pub use error::{PipelineError, Result};
pub use models::{
    ArticleMetadata, ArticlePaths, DraftUpdate, EditLocation, NoteDraft, RepoCoordinate,
    Visibility,
};
pub use parser::{
    DialectChecker, DialectWarning, Frontmatter, FrontmatterParser, MarkdownNormalizer,
};
pub use remote::{
    ContentFetcher, Credentials, GithubContentsWriter, GithubRawFetcher, LocalFetcher,
    LocalWriter, NoteClient, PlatformClient, RepositoryWriter,
};
pub use repository::{ArticleScaffold, ArticleScanner, ScannedArticle};
pub use sync::{PullOptions, PushOptions, SyncOrchestrator, SyncStats};
pub use utils::{OperationTimer, Template, Validator};
