// file: src/sync/push.rs
// description: repository article to platform draft
// reference: fetch, convert, then update with the shared session

use crate::config::Config;
use crate::converter::{MarkdownToHtml, resolve_image_sources};
use crate::error::{PipelineError, Result};
use crate::models::{ArticleMetadata, ArticlePaths, DraftUpdate};
use crate::parser::{DialectChecker, DialectWarning, FrontmatterParser, MarkdownNormalizer};
use crate::remote::{ContentFetcher, PlatformClient, RepositoryWriter};
use crate::sync::state::StateRecorder;
use crate::utils::Validator;
use chrono::Utc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    pub dry_run: bool,
    /// Push even while note holds a recent hand-off.
    pub force: bool,
}

/// What was (or, in a dry run, would have been) sent for one article.
#[derive(Debug, Clone)]
pub struct PushReport {
    pub slug: String,
    pub note_id: String,
    pub title: String,
    pub html: String,
    pub warnings: Vec<DialectWarning>,
    pub sent: bool,
}

struct Rendered {
    paths: ArticlePaths,
    meta: ArticleMetadata,
    markdown: String,
    report: PushReport,
}

pub struct ArticlePusher<'a, F, P, W> {
    fetcher: &'a F,
    platform: &'a P,
    state: Option<StateRecorder<'a, W>>,
    config: &'a Config,
    converter: MarkdownToHtml,
    frontmatter: FrontmatterParser,
    normalizer: MarkdownNormalizer,
    dialect: DialectChecker,
}

impl<'a, F, P, W> ArticlePusher<'a, F, P, W>
where
    F: ContentFetcher,
    P: PlatformClient,
    W: RepositoryWriter,
{
    /// `state` receives the updated `meta.json` after each push; without it
    /// the sync state is left as it was.
    pub fn new(fetcher: &'a F, platform: &'a P, state: Option<&'a W>, config: &'a Config) -> Self {
        Self {
            fetcher,
            platform,
            state: state
                .filter(|_| config.sync.record_state)
                .map(|writer| StateRecorder::new(writer, config)),
            config,
            converter: MarkdownToHtml::new(),
            frontmatter: FrontmatterParser::new(),
            normalizer: MarkdownNormalizer::new(),
            dialect: DialectChecker::new(),
        }
    }

    /// Reads the article and renders the draft body without contacting the
    /// platform.
    pub async fn prepare(&self, slug: &str) -> Result<PushReport> {
        Ok(self.render(slug).await?.report)
    }

    async fn render(&self, slug: &str) -> Result<Rendered> {
        Validator::validate_slug(slug)?;
        let paths = ArticlePaths::new(&self.config.repository.articles_root, slug);

        let descriptor_path = paths.descriptor();
        let descriptor = self.fetcher.fetch(&descriptor_path).await?;
        let meta = ArticleMetadata::from_json(&descriptor_path, &descriptor)?;

        let markdown = self.fetcher.fetch(&paths.markdown()).await?;
        let (frontmatter, body) = self.frontmatter.split(&markdown)?;

        let title = frontmatter
            .get("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| meta.title.clone());

        let body = if self.config.sync.normalize_markdown {
            self.normalizer.canonicalize(&body)
        } else {
            body
        };

        let warnings = self.dialect.check(&body);
        for warning in &warnings {
            warn!("{}: {}", paths.markdown(), warning);
        }

        let mut html = self.converter.render(&body);
        if let Some(assets) = &self.config.repository.assets_base_url {
            let base = format!("{}/{}", assets.trim_end_matches('/'), paths.directory());
            html = resolve_image_sources(&html, &base);
        }

        debug!(
            "Rendered {} ({} bytes markdown -> {} bytes html)",
            slug,
            body.len(),
            html.len()
        );

        let report = PushReport {
            slug: slug.to_string(),
            note_id: meta.note_id.clone(),
            title,
            html,
            warnings,
            sent: false,
        };

        Ok(Rendered {
            paths,
            meta,
            markdown,
            report,
        })
    }

    pub async fn push(
        &self,
        session: &P::Session,
        slug: &str,
        options: PushOptions,
    ) -> Result<PushReport> {
        let Rendered {
            paths,
            mut meta,
            markdown,
            mut report,
        } = self.render(slug).await?;

        self.check_lock(slug, &meta, options.force)?;

        if options.dry_run {
            info!("[dry run] would update note {} from {}", report.note_id, slug);
            return Ok(report);
        }

        let update = DraftUpdate {
            title: report.title.clone(),
            body: report.html.clone(),
            visibility: self.config.platform.visibility,
        };

        let updated = self
            .platform
            .update_draft(session, &report.note_id, &update)
            .await?;

        info!("Pushed {} to note {}", slug, report.note_id);
        report.sent = true;

        if let Some(state) = &self.state {
            meta.record_push(
                Utc::now(),
                self.normalizer.fingerprint(&markdown),
                updated.updated_at,
            );
            state.save_metadata(&paths, &meta).await?;
        }

        Ok(report)
    }

    fn check_lock(&self, slug: &str, meta: &ArticleMetadata, force: bool) -> Result<()> {
        if !self.config.sync.check_lock {
            return Ok(());
        }

        let Some(age) = meta.note_lock_age(Utc::now(), self.config.lock_window()) else {
            return Ok(());
        };

        if !force {
            return Err(PipelineError::EditLocked {
                slug: slug.to_string(),
                minutes: age.num_minutes(),
            });
        }

        warn!(
            "{}: handed to note {} minute(s) ago ({}); overwriting note's copy",
            slug,
            age.num_minutes(),
            meta.editing.version
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{EditLocation, Visibility};
    use crate::remote::Credentials;
    use crate::sync::fakes::{MemoryFetcher, MemoryWriter, RecordingPlatform};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    const META: &str = r#"{"note_id": "n1a2b3", "title": "Sidecar title"}"#;

    fn options(dry_run: bool) -> PushOptions {
        PushOptions {
            dry_run,
            force: false,
        }
    }

    async fn push(
        fetcher: &MemoryFetcher,
        platform: &RecordingPlatform,
        config: &Config,
        dry_run: bool,
    ) -> Result<PushReport> {
        push_with(fetcher, platform, None, config, options(dry_run)).await
    }

    async fn push_with(
        fetcher: &MemoryFetcher,
        platform: &RecordingPlatform,
        state: Option<&MemoryWriter>,
        config: &Config,
        options: PushOptions,
    ) -> Result<PushReport> {
        let session = platform
            .login(&Credentials::new("a@example.com", "pw"))
            .await?;
        ArticlePusher::new(fetcher, platform, state, config)
            .push(&session, "hello", options)
            .await
    }

    fn locked_meta(minutes_ago: i64) -> String {
        let locked_at = crate::models::article::timestamp(Utc::now() - Duration::minutes(minutes_ago));
        format!(
            r#"{{"note_id": "n1a2b3", "title": "T", "editing": {{"location": "note", "locked_at": "{}", "version": "v4"}}}}"#,
            locked_at
        )
    }

    #[tokio::test]
    async fn test_push_sends_rendered_html() {
        let fetcher = MemoryFetcher::default().with_article(
            "hello",
            META,
            "---\ntitle: Frontmatter title\n---\n\n# Intro\n\n* one\n* **two**\n",
        );
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        let report = push(&fetcher, &platform, &config, false).await.unwrap();

        assert!(report.sent);
        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        let (note_id, update) = &sent[0];
        assert_eq!(note_id, "n1a2b3");
        assert_eq!(update.title, "Frontmatter title");
        assert_eq!(update.visibility, Visibility::Draft);
        assert_eq!(
            update.body,
            "<h1>Intro</h1><ul><li>one</li><li><strong>two</strong></li></ul>"
        );
    }

    #[tokio::test]
    async fn test_push_uses_sidecar_title_without_frontmatter() {
        let fetcher = MemoryFetcher::default().with_article("hello", META, "Body text\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        push(&fetcher, &platform, &config, false).await.unwrap();

        let sent = platform.sent();
        assert_eq!(sent[0].1.title, "Sidecar title");
        assert_eq!(sent[0].1.body, "<p>Body text</p>");
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let fetcher = MemoryFetcher::default().with_article("hello", META, "# Hi\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        let report = push(&fetcher, &platform, &config, true).await.unwrap();

        assert!(!report.sent);
        assert_eq!(report.html, "<h1>Hi</h1>");
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_push_resolves_relative_images() {
        let fetcher = MemoryFetcher::default().with_article(
            "hello",
            META,
            "![diagram](./images/a.png)\n",
        );
        let platform = RecordingPlatform::default();
        let mut config = Config::default_config();
        config.repository.assets_base_url =
            Some("https://raw.githubusercontent.com/user/articles/main/".to_string());

        let report = push(&fetcher, &platform, &config, true).await.unwrap();

        assert!(report.html.contains(
            "src=\"https://raw.githubusercontent.com/user/articles/main/articles/hello/images/a.png\""
        ));
    }

    #[tokio::test]
    async fn test_push_reports_dialect_warnings() {
        let fetcher =
            MemoryFetcher::default().with_article("hello", META, "| a | b |\n|---|---|\n| 1 | 2 |\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        let report = push(&fetcher, &platform, &config, true).await.unwrap();

        assert!(!report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_push_missing_descriptor() {
        let fetcher = MemoryFetcher::default().with_file("articles/hello/index.md", "# Hi\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        let err = push(&fetcher, &platform, &config, false).await.unwrap_err();

        assert!(matches!(err, PipelineError::FetchFailure { .. }));
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_push_rejects_invalid_slug() {
        let fetcher = MemoryFetcher::default();
        let platform = RecordingPlatform::default();
        let config = Config::default_config();
        let session = platform
            .login(&Credentials::new("a@example.com", "pw"))
            .await
            .unwrap();

        let err = ArticlePusher::new(&fetcher, &platform, None::<&MemoryWriter>, &config)
            .push(&session, "../etc", options(false))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_recent_note_hand_off_blocks_push() {
        let fetcher = MemoryFetcher::default().with_article("hello", &locked_meta(3), "# Hi\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        let err = push(&fetcher, &platform, &config, false).await.unwrap_err();

        assert!(matches!(err, PipelineError::EditLocked { minutes: 3, .. }));
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn test_force_overrides_note_hand_off() {
        let fetcher = MemoryFetcher::default().with_article("hello", &locked_meta(3), "# Hi\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();
        let options = PushOptions {
            dry_run: false,
            force: true,
        };

        let report = push_with(&fetcher, &platform, None, &config, options)
            .await
            .unwrap();

        assert!(report.sent);
        assert_eq!(platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_or_disabled_lock_allows_push() {
        let fetcher = MemoryFetcher::default().with_article("hello", &locked_meta(11), "# Hi\n");
        let platform = RecordingPlatform::default();
        let config = Config::default_config();

        assert!(push(&fetcher, &platform, &config, false).await.unwrap().sent);

        let fetcher = MemoryFetcher::default().with_article("hello", &locked_meta(1), "# Hi\n");
        let mut config = Config::default_config();
        config.sync.check_lock = false;

        assert!(push(&fetcher, &platform, &config, false).await.unwrap().sent);
    }

    #[tokio::test]
    async fn test_push_records_sync_state() {
        let markdown = "---\ntitle: T\n---\n\n# Hi\n";
        let fetcher = MemoryFetcher::default().with_article("hello", META, markdown);
        let platform = RecordingPlatform::default();
        let writer = MemoryWriter::default().with_file("articles/hello/meta.json", META);
        let config = Config::default_config();

        push_with(&fetcher, &platform, Some(&writer), &config, options(false))
            .await
            .unwrap();

        let saved = writer.file("articles/hello/meta.json").unwrap();
        let meta = ArticleMetadata::from_json("meta.json", &saved).unwrap();
        assert_eq!(meta.editing.location, EditLocation::Note);
        assert_eq!(meta.editing.version, "v2");
        assert!(meta.editing.locked_at.is_some());
        assert_eq!(
            meta.versions.hash.repository,
            MarkdownNormalizer::new().fingerprint(markdown)
        );
        assert_eq!(meta.versions.note_revision.as_deref(), Some("2026-01-02T04:00:00+09:00"));
        assert!(meta.sync.last_push.is_some());
        assert_eq!(meta.sync.last_pull, None);
    }

    #[tokio::test]
    async fn test_dry_run_and_disabled_state_leave_descriptor_alone() {
        let fetcher = MemoryFetcher::default().with_article("hello", META, "# Hi\n");
        let platform = RecordingPlatform::default();
        let writer = MemoryWriter::default().with_file("articles/hello/meta.json", META);
        let config = Config::default_config();

        push_with(&fetcher, &platform, Some(&writer), &config, options(true))
            .await
            .unwrap();

        let mut config = Config::default_config();
        config.sync.record_state = false;
        push_with(&fetcher, &platform, Some(&writer), &config, options(false))
            .await
            .unwrap();

        assert!(writer.committed().is_empty());
        assert_eq!(platform.sent().len(), 1);
    }
}
