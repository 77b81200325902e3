// file: src/sync/fakes.rs
// description: in-memory collaborators for sync tests
// reference: trait fakes for async collaborator tests

use crate::error::{PipelineError, Result};
use crate::models::{DraftUpdate, NoteDraft};
use crate::parser::content_hash;
use crate::remote::{
    CommitReceipt, CommitRequest, ContentFetcher, Credentials, PlatformClient, RemoteFile,
    RepositoryWriter,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryFetcher {
    files: HashMap<String, String>,
}

impl MemoryFetcher {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_article(self, slug: &str, meta: &str, markdown: &str) -> Self {
        self.with_file(&format!("articles/{}/meta.json", slug), meta)
            .with_file(&format!("articles/{}/index.md", slug), markdown)
    }
}

impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| PipelineError::fetch(path, "status 404 Not Found"))
    }
}

#[derive(Default)]
pub struct RecordingPlatform {
    pub drafts: HashMap<String, NoteDraft>,
    pub published: HashMap<String, NoteDraft>,
    pub updates: Mutex<Vec<(String, DraftUpdate)>>,
    pub logins: AtomicUsize,
    pub reject_login: bool,
}

impl RecordingPlatform {
    pub fn with_draft(mut self, id: &str, title: &str, body: &str) -> Self {
        self.drafts.insert(
            id.to_string(),
            NoteDraft {
                id: id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                updated_at: Some("2026-01-02T03:04:05+09:00".to_string()),
            },
        );
        self
    }

    pub fn with_published(mut self, id: &str, title: &str, body: &str) -> Self {
        self.published.insert(
            id.to_string(),
            NoteDraft {
                id: id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                updated_at: None,
            },
        );
        self
    }

    pub fn sent(&self) -> Vec<(String, DraftUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

pub struct FakeSession;

impl PlatformClient for RecordingPlatform {
    type Session = FakeSession;

    async fn login(&self, _credentials: &Credentials) -> Result<FakeSession> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if self.reject_login {
            return Err(PipelineError::AuthFailure("bad credentials".to_string()));
        }
        Ok(FakeSession)
    }

    async fn get_draft(&self, _session: &FakeSession, note_id: &str) -> Result<NoteDraft> {
        self.drafts
            .get(note_id)
            .cloned()
            .ok_or_else(|| PipelineError::fetch(format!("note {}", note_id), "status 404"))
    }

    async fn get_published(&self, _session: &FakeSession, note_id: &str) -> Result<NoteDraft> {
        self.published
            .get(note_id)
            .cloned()
            .ok_or_else(|| PipelineError::fetch(format!("note {}", note_id), "status 404"))
    }

    async fn update_draft(
        &self,
        _session: &FakeSession,
        note_id: &str,
        update: &DraftUpdate,
    ) -> Result<NoteDraft> {
        self.updates
            .lock()
            .unwrap()
            .push((note_id.to_string(), update.clone()));
        Ok(NoteDraft {
            id: note_id.to_string(),
            title: update.title.clone(),
            body: update.body.clone(),
            updated_at: Some("2026-01-02T04:00:00+09:00".to_string()),
        })
    }
}

#[derive(Default)]
pub struct MemoryWriter {
    pub files: Mutex<HashMap<String, String>>,
    pub commits: Mutex<Vec<CommitRequest>>,
}

impl MemoryWriter {
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn committed(&self) -> Vec<CommitRequest> {
        self.commits.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl RepositoryWriter for MemoryWriter {
    async fn read(&self, path: &str) -> Result<Option<RemoteFile>> {
        Ok(self.files.lock().unwrap().get(path).map(|content| RemoteFile {
            content: content.clone(),
            sha: content_hash(content),
        }))
    }

    async fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        let mut files = self.files.lock().unwrap();
        let current = files.get(&request.path).map(|c| content_hash(c));
        if current != request.sha {
            return Err(PipelineError::conflict(&request.path, "sha mismatch"));
        }

        let created = current.is_none();
        files.insert(request.path.clone(), request.content.clone());
        self.commits.lock().unwrap().push(request.clone());

        Ok(CommitReceipt {
            path: request.path.clone(),
            commit_sha: Some(content_hash(&request.content)),
            created,
        })
    }
}
