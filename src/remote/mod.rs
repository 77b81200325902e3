// file: src/remote/mod.rs
// description: collaborators for the article repository and the publishing platform

pub mod fetcher;
pub mod platform;
pub mod writer;

pub use fetcher::{ContentFetcher, GithubRawFetcher, LocalFetcher};
pub use platform::{Credentials, NoteClient, NoteSession, PlatformClient};
pub use writer::{
    CommitReceipt, CommitRequest, GithubContentsWriter, LocalWriter, RemoteFile, RepositoryWriter,
};
