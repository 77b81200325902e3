// file: src/remote/fetcher.rs
// description: read-only access to article sources on GitHub or a local checkout
// reference: https://docs.github.com/en/repositories/working-with-files/using-files/getting-permanent-links-to-files

use crate::error::{PipelineError, Result};
use crate::models::RepoCoordinate;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub trait ContentFetcher: Send + Sync {
    /// Returns the UTF-8 text at a repository-relative path.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct GithubRawFetcher {
    client: Client,
    raw_base_url: String,
    coordinate: RepoCoordinate,
    token: Option<String>,
}

impl GithubRawFetcher {
    pub fn new(
        raw_base_url: &str,
        coordinate: RepoCoordinate,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("note_sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            raw_base_url: raw_base_url.trim_end_matches('/').to_string(),
            coordinate,
            token,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_base_url,
            self.coordinate.repo,
            self.coordinate.branch,
            path.trim_start_matches('/')
        )
    }
}

impl ContentFetcher for GithubRawFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        debug!("Fetching {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::fetch(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(path, format!("status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| PipelineError::fetch(path, e.to_string()))
    }
}

/// Reads articles from a working copy on disk.
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentFetcher for LocalFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        debug!("Reading {}", full_path.display());

        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::fetch(path, "file not found"))
            }
            Err(e) => Err(PipelineError::FileOperation {
                path: full_path,
                source: e,
            }),
        }
    }
}
