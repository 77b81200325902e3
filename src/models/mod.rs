// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod article;
pub mod draft;

pub use article::{
    ArticleMetadata, ArticlePaths, ContentHashes, EditLocation, EditingState, RepoCoordinate,
    SyncTimestamps, VersionState,
};
pub use draft::{DraftUpdate, NoteDraft, Visibility};
