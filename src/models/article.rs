// file: src/models/article.rs
// description: article sidecar metadata, sync state, repository coordinates and article paths
// reference: internal data structures

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const KNOWN_KEYS: [&str; 8] = [
    "note_id", "noteId", "title", "slug", "status", "editing", "versions", "sync",
];

/// Sidecar descriptor (`meta.json`) stored next to each article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub note_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub editing: EditingState,
    #[serde(default)]
    pub versions: VersionState,
    #[serde(default)]
    pub sync: SyncTimestamps,
    /// Keys this tool does not manage, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which side an article was last handed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditLocation {
    #[serde(alias = "obsidian")]
    Repository,
    Note,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingState {
    #[serde(default)]
    pub location: EditLocation,
    /// RFC 3339 time of the last sync that moved the article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<String>,
    #[serde(default = "first_version")]
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for EditingState {
    fn default() -> Self {
        Self {
            location: EditLocation::None,
            locked_at: None,
            version: first_version(),
            extra: Map::new(),
        }
    }
}

/// Fingerprints recorded at the last sync. An empty string means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHashes {
    #[serde(default, alias = "obsidian")]
    pub repository: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_revision: Option<String>,
    #[serde(default)]
    pub hash: ContentHashes,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_push: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pull: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn first_version() -> String {
    "v1".to_string()
}

/// `v3` becomes `v4`; anything unparseable restarts at `v1`.
pub fn next_version(version: &str) -> String {
    version
        .strip_prefix('v')
        .and_then(|number| number.parse::<u64>().ok())
        .map(|number| format!("v{}", number + 1))
        .unwrap_or_else(first_version)
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ArticleMetadata {
    pub fn new(note_id: &str, title: &str, slug: &str) -> Self {
        Self {
            note_id: note_id.to_string(),
            title: title.to_string(),
            slug: Some(slug.to_string()),
            status: Some("draft".to_string()),
            editing: EditingState {
                location: EditLocation::Repository,
                ..EditingState::default()
            },
            versions: VersionState::default(),
            sync: SyncTimestamps::default(),
            extra: Map::new(),
        }
    }

    /// Parses a descriptor. Both `note_id` and `noteId` are accepted and the
    /// sync-state sections are optional.
    pub fn from_json(path: &str, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PipelineError::malformed(path, format!("invalid JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| PipelineError::malformed(path, "expected a JSON object"))?;

        let note_id = string_field(object, &["note_id", "noteId"])
            .ok_or_else(|| PipelineError::malformed(path, "missing field `note_id`"))?;
        let title = string_field(object, &["title"])
            .ok_or_else(|| PipelineError::malformed(path, "missing field `title`"))?;

        let extra = object
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            note_id,
            title,
            slug: string_field(object, &["slug"]),
            status: string_field(object, &["status"]),
            editing: section(path, object, "editing")?,
            versions: section(path, object, "versions")?,
            sync: section(path, object, "sync")?,
            extra,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map(|json| json + "\n")
            .map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    /// Published articles are pulled from the public page, everything else
    /// from the draft.
    pub fn is_published(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("published"))
    }

    /// How long ago the article was handed to note, while that hand-off is
    /// still inside `window`.
    pub fn note_lock_age(&self, now: DateTime<Utc>, window: Duration) -> Option<Duration> {
        if self.editing.location != EditLocation::Note {
            return None;
        }

        let locked_at = self.editing.locked_at.as_deref()?;
        let locked_at = DateTime::parse_from_rfc3339(locked_at).ok()?;
        let age = (now - locked_at.with_timezone(&Utc)).max(Duration::zero());

        (age <= window).then_some(age)
    }

    pub fn record_push(
        &mut self,
        now: DateTime<Utc>,
        repository_hash: String,
        note_revision: Option<String>,
    ) {
        self.hand_off(EditLocation::Note, now);
        self.versions.hash.repository = repository_hash;
        if note_revision.is_some() {
            self.versions.note_revision = note_revision;
        }
        self.sync.last_push = Some(timestamp(now));
    }

    pub fn record_pull(
        &mut self,
        now: DateTime<Utc>,
        repository_hash: String,
        note_hash: String,
        note_revision: Option<String>,
    ) {
        self.hand_off(EditLocation::Repository, now);
        self.versions.hash.repository = repository_hash;
        self.versions.hash.note = note_hash;
        if note_revision.is_some() {
            self.versions.note_revision = note_revision;
        }
        self.sync.last_pull = Some(timestamp(now));
    }

    fn hand_off(&mut self, location: EditLocation, now: DateTime<Utc>) {
        self.editing.location = location;
        self.editing.locked_at = Some(timestamp(now));
        self.editing.version = next_version(&self.editing.version);
    }
}

fn section<T>(path: &str, object: &Map<String, Value>, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match object.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| PipelineError::malformed(path, format!("invalid `{}`: {}", key, e))),
    }
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// `owner/name` plus branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCoordinate {
    pub repo: String,
    pub branch: String,
}

impl RepoCoordinate {
    pub fn new(repo: &str, branch: &str) -> Self {
        Self {
            repo: repo.to_string(),
            branch: branch.to_string(),
        }
    }
}

/// Repository-relative paths of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePaths {
    root: String,
    slug: String,
}

impl ArticlePaths {
    pub fn new(articles_root: &str, slug: &str) -> Self {
        Self {
            root: articles_root.trim_matches('/').to_string(),
            slug: slug.to_string(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn directory(&self) -> String {
        if self.root.is_empty() {
            self.slug.clone()
        } else {
            format!("{}/{}", self.root, self.slug)
        }
    }

    pub fn markdown(&self) -> String {
        format!("{}/index.md", self.directory())
    }

    pub fn descriptor(&self) -> String {
        format!("{}/meta.json", self.directory())
    }

    pub fn conflict(&self) -> String {
        format!("{}/index.CONFLICT.md", self.directory())
    }
}
