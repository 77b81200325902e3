// file: src/remote/writer.rs
// description: optimistic-concurrency writes to the article repository
// reference: https://docs.github.com/en/rest/repos/contents

use crate::error::{PipelineError, Result};
use crate::models::RepoCoordinate;
use crate::parser::content_hash;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Current content of a repository file plus the token that must accompany
/// an update of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub path: String,
    pub content: String,
    pub message: String,
    /// Absent when creating a file; required when replacing one.
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub path: String,
    pub commit_sha: Option<String>,
    pub created: bool,
}

pub trait RepositoryWriter: Send + Sync {
    fn read(&self, path: &str) -> impl Future<Output = Result<Option<RemoteFile>>> + Send;

    fn commit(&self, request: &CommitRequest)
    -> impl Future<Output = Result<CommitReceipt>> + Send;
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    #[serde(default)]
    commit: Option<CommitInfo>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

pub struct GithubContentsWriter {
    client: Client,
    api_base_url: String,
    coordinate: RepoCoordinate,
    token: String,
}

impl GithubContentsWriter {
    pub fn new(
        api_base_url: &str,
        coordinate: RepoCoordinate,
        token: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("note_sync")
            .build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            coordinate,
            token,
        })
    }

    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base_url,
            self.coordinate.repo,
            path.trim_start_matches('/')
        )
    }
}

/// The contents API wraps base64 at 60 columns.
pub fn decode_contents(path: &str, encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PipelineError::Serialization(format!("{}: invalid base64: {}", path, e)))?;

    String::from_utf8(bytes)
        .map_err(|e| PipelineError::Serialization(format!("{}: not UTF-8: {}", path, e)))
}

impl RepositoryWriter for GithubContentsWriter {
    async fn read(&self, path: &str) -> Result<Option<RemoteFile>> {
        let url = self.contents_url(path);
        debug!("Reading {} at {}", url, self.coordinate.branch);

        let response = self
            .client
            .get(&url)
            .query(&[("ref", self.coordinate.branch.as_str())])
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PipelineError::fetch(path, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PipelineError::fetch(path, format!("status {}", status)));
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Serialization(format!("{}: {}", path, e)))?;

        Ok(Some(RemoteFile {
            content: decode_contents(path, &body.content)?,
            sha: body.sha,
        }))
    }

    async fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        let url = self.contents_url(&request.path);
        let payload = PutContentsRequest {
            message: &request.message,
            content: BASE64_STANDARD.encode(request.content.as_bytes()),
            branch: &self.coordinate.branch,
            sha: request.sha.as_deref(),
        };

        let response = self
            .client
            .put(&url)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::fetch(&request.path, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unable to read error body)".to_string());
            return Err(PipelineError::conflict(
                &request.path,
                format!("status {}: {}", status, body.trim()),
            ));
        }
        if !status.is_success() {
            return Err(PipelineError::fetch(&request.path, format!("status {}", status)));
        }

        let body: PutContentsResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Serialization(format!("{}: {}", request.path, e)))?;

        let receipt = CommitReceipt {
            path: request.path.clone(),
            commit_sha: body.commit.map(|commit| commit.sha),
            created: status == StatusCode::CREATED,
        };

        info!(
            "Committed {} ({})",
            receipt.path,
            receipt.commit_sha.as_deref().unwrap_or("no sha")
        );

        Ok(receipt)
    }
}

/// Writes into a working copy. The concurrency token is the SHA-256 of the
/// file's current content.
pub struct LocalWriter {
    root: PathBuf,
}

impl LocalWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    async fn read_existing(&self, full_path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(full_path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PipelineError::FileOperation {
                path: full_path.to_path_buf(),
                source: e,
            }),
        }
    }
}

impl RepositoryWriter for LocalWriter {
    async fn read(&self, path: &str) -> Result<Option<RemoteFile>> {
        let full_path = self.resolve(path);
        Ok(self.read_existing(&full_path).await?.map(|content| RemoteFile {
            sha: content_hash(&content),
            content,
        }))
    }

    async fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        let full_path = self.resolve(&request.path);
        let existing = self.read_existing(&full_path).await?;

        match (&existing, &request.sha) {
            (None, Some(_)) => {
                return Err(PipelineError::conflict(
                    &request.path,
                    "file no longer exists",
                ));
            }
            (Some(_), None) => {
                return Err(PipelineError::conflict(
                    &request.path,
                    "file already exists; sha required to replace it",
                ));
            }
            (Some(current), Some(expected)) if content_hash(current) != *expected => {
                return Err(PipelineError::conflict(
                    &request.path,
                    "file changed since it was read",
                ));
            }
            _ => {}
        }

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::FileOperation {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        tokio::fs::write(&full_path, &request.content)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: full_path.clone(),
                source: e,
            })?;

        info!("Wrote {} ({})", full_path.display(), request.message);

        Ok(CommitReceipt {
            path: request.path.clone(),
            commit_sha: Some(content_hash(&request.content)),
            created: existing.is_none(),
        })
    }
}
