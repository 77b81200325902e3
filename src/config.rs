// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::models::{RepoCoordinate, Visibility};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: pull from note [{slug}] [skip ci]";
pub const DEFAULT_STATE_MESSAGE: &str = "chore: sync state for {slug} [skip ci]";
pub const DEFAULT_LOCK_MINUTES: u64 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub platform: PlatformConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// `owner/name` of the source-of-truth repository.
    pub repo: String,
    pub branch: String,
    pub articles_root: String,
    pub raw_base_url: String,
    pub api_base_url: String,
    /// When set, articles are read from and written to this checkout instead
    /// of the GitHub APIs.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Prefix for relative image sources in pushed HTML.
    #[serde(default)]
    pub assets_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    pub base_url: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    pub parallel_workers: usize,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_true")]
    pub normalize_markdown: bool,
    #[serde(default)]
    pub pull_frontmatter: bool,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Write `editing`, `versions` and `sync` back into `meta.json`.
    #[serde(default = "default_true")]
    pub record_state: bool,
    #[serde(default = "default_state_message")]
    pub state_message: String,
    /// Refuse to push while note holds a recent hand-off.
    #[serde(default = "default_true")]
    pub check_lock: bool,
    #[serde(default = "default_lock_minutes")]
    pub lock_minutes: u64,
}

fn default_true() -> bool {
    true
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

fn default_state_message() -> String {
    DEFAULT_STATE_MESSAGE.to_string()
}

fn default_lock_minutes() -> u64 {
    DEFAULT_LOCK_MINUTES
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("NOTE_SYNC")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            repository: RepositoryConfig {
                repo: "user/articles".to_string(),
                branch: "main".to_string(),
                articles_root: "articles".to_string(),
                raw_base_url: "https://raw.githubusercontent.com".to_string(),
                api_base_url: "https://api.github.com".to_string(),
                local_path: None,
                assets_base_url: None,
            },
            platform: PlatformConfig {
                base_url: "https://note.com".to_string(),
                visibility: Visibility::Draft,
            },
            sync: SyncConfig {
                parallel_workers: 4,
                request_timeout_secs: 30,
                dry_run: false,
                normalize_markdown: true,
                pull_frontmatter: false,
                commit_message: default_commit_message(),
                record_state: true,
                state_message: default_state_message(),
                check_lock: true,
                lock_minutes: DEFAULT_LOCK_MINUTES,
            },
        }
    }

    pub fn coordinate(&self) -> RepoCoordinate {
        RepoCoordinate::new(&self.repository.repo, &self.repository.branch)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.request_timeout_secs)
    }

    pub fn lock_window(&self) -> chrono::Duration {
        let minutes = i64::try_from(self.sync.lock_minutes).unwrap_or(i64::MAX);
        chrono::Duration::try_minutes(minutes).unwrap_or(chrono::Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.sync.request_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.repository.branch.trim().is_empty() {
            return Err(PipelineError::Config("branch must not be empty".to_string()));
        }

        Validator::validate_repo_coordinate(&self.repository.repo)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        for url in [
            &self.repository.raw_base_url,
            &self.repository.api_base_url,
            &self.platform.base_url,
        ] {
            Validator::validate_url(url).map_err(|e| PipelineError::Config(e.to_string()))?;
        }

        if let Some(assets) = &self.repository.assets_base_url {
            Validator::validate_url(assets).map_err(|e| PipelineError::Config(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();

        assert!(config.validate().is_ok());
        assert_eq!(config.platform.visibility, Visibility::Draft);
        assert_eq!(config.coordinate().branch, "main");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default_config();
        config.sync.parallel_workers = 0;

        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_bad_repo_rejected() {
        let mut config = Config::default_config();
        config.repository.repo = "not-a-coordinate".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sync.toml");
        fs::write(
            &path,
            r#"
[repository]
repo = "alice/blog"
branch = "drafts"
articles_root = "posts"
raw_base_url = "https://raw.githubusercontent.com"
api_base_url = "https://api.github.com"

[platform]
base_url = "https://note.com"

[sync]
parallel_workers = 2
request_timeout_secs = 10
pull_frontmatter = true
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.repository.repo, "alice/blog");
        assert_eq!(config.repository.articles_root, "posts");
        assert_eq!(config.sync.parallel_workers, 2);
        assert!(config.sync.pull_frontmatter);
        assert!(config.sync.normalize_markdown);
        assert_eq!(config.sync.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert!(config.sync.record_state);
        assert!(config.sync.check_lock);
        assert_eq!(config.lock_window(), chrono::Duration::minutes(10));
        assert_eq!(config.platform.visibility, Visibility::Draft);
    }
}
