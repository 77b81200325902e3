// file: src/sync/pull.rs
// description: platform draft back into the repository
// reference: fetch draft, convert, compare, then commit with the prior sha

use crate::config::Config;
use crate::converter::{HtmlToMarkdown, image_sources};
use crate::error::{PipelineError, Result};
use crate::models::{ArticleMetadata, ArticlePaths, NoteDraft};
use crate::parser::{Frontmatter, FrontmatterParser, MarkdownNormalizer, content_hash};
use crate::remote::{CommitRequest, ContentFetcher, PlatformClient, RemoteFile, RepositoryWriter};
use crate::sync::state::{ConflictFile, StateRecorder};
use crate::utils::{Template, Validator};
use chrono::Utc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    pub dry_run: bool,
    /// Commit even when the normalized content is unchanged or the
    /// repository copy diverged since the last sync.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    Committed { commit_sha: Option<String> },
    Unchanged,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct PullReport {
    pub slug: String,
    pub note_id: String,
    pub path: String,
    pub markdown: String,
    pub outcome: PullOutcome,
}

pub struct ArticlePuller<'a, F, P, W> {
    fetcher: &'a F,
    platform: &'a P,
    writer: &'a W,
    state: StateRecorder<'a, W>,
    config: &'a Config,
    converter: HtmlToMarkdown,
    frontmatter: FrontmatterParser,
    normalizer: MarkdownNormalizer,
}

impl<'a, F, P, W> ArticlePuller<'a, F, P, W>
where
    F: ContentFetcher,
    P: PlatformClient,
    W: RepositoryWriter,
{
    pub fn new(fetcher: &'a F, platform: &'a P, writer: &'a W, config: &'a Config) -> Self {
        Self {
            fetcher,
            platform,
            writer,
            state: StateRecorder::new(writer, config),
            config,
            converter: HtmlToMarkdown::new(),
            frontmatter: FrontmatterParser::new(),
            normalizer: MarkdownNormalizer::new(),
        }
    }

    pub async fn pull(
        &self,
        session: &P::Session,
        slug: &str,
        options: PullOptions,
    ) -> Result<PullReport> {
        Validator::validate_slug(slug)?;
        let paths = ArticlePaths::new(&self.config.repository.articles_root, slug);

        let descriptor_path = paths.descriptor();
        let descriptor = self.fetcher.fetch(&descriptor_path).await?;
        let mut meta = ArticleMetadata::from_json(&descriptor_path, &descriptor)?;

        let draft = if meta.is_published() {
            debug!("{} is published; reading the public article", slug);
            self.platform.get_published(session, &meta.note_id).await?
        } else {
            self.platform.get_draft(session, &meta.note_id).await?
        };

        let dropped = image_sources(&draft.body);
        if !dropped.is_empty() {
            warn!(
                "{}: {} image(s) in note {} are not carried into markdown",
                slug,
                dropped.len(),
                meta.note_id
            );
        }

        let body = self.converter.render(&draft.body);
        let path = paths.markdown();
        let existing = self.writer.read(&path).await?;
        let markdown = self.compose(slug, &meta, &draft, existing.as_ref(), &body);

        let mut report = PullReport {
            slug: slug.to_string(),
            note_id: meta.note_id.clone(),
            path: path.clone(),
            markdown,
            outcome: PullOutcome::Unchanged,
        };

        if let Some(current) = &existing {
            let unchanged = self.normalizer.fingerprint(&current.content)
                == self.normalizer.fingerprint(&report.markdown);
            if unchanged && !options.force {
                info!("{} is unchanged; skipping commit", path);
                return Ok(report);
            }

            self.check_divergence(&paths, &meta, current, &body, options)
                .await?;
        }

        if options.dry_run {
            info!("[dry run] would commit {} from note {}", path, meta.note_id);
            report.outcome = PullOutcome::DryRun;
            return Ok(report);
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let message = Template::new(&self.config.sync.commit_message).render(&[
            ("slug", slug),
            ("note_id", &meta.note_id),
            ("date", &date),
        ]);

        let request = CommitRequest {
            path,
            content: report.markdown.clone(),
            message,
            sha: existing.map(|file| file.sha),
        };

        let receipt = self.writer.commit(&request).await?;
        debug!(
            "Commit for {} {}",
            receipt.path,
            if receipt.created { "created the file" } else { "updated the file" }
        );

        if self.config.sync.record_state {
            meta.record_pull(
                Utc::now(),
                self.normalizer.fingerprint(&report.markdown),
                content_hash(&draft.body),
                draft.updated_at.clone(),
            );
            self.state.save_metadata(&paths, &meta).await?;
        }

        report.outcome = PullOutcome::Committed {
            commit_sha: receipt.commit_sha,
        };
        Ok(report)
    }

    /// A repository copy whose fingerprint moved away from the one recorded
    /// at the last sync has local edits that this pull would overwrite.
    async fn check_divergence(
        &self,
        paths: &ArticlePaths,
        meta: &ArticleMetadata,
        current: &RemoteFile,
        pulled_body: &str,
        options: PullOptions,
    ) -> Result<()> {
        let base = &meta.versions.hash.repository;
        if base.is_empty() {
            return Ok(());
        }

        let local = self.normalizer.fingerprint(&current.content);
        if &local == base {
            return Ok(());
        }

        warn!(
            "{}: repository copy changed since the last sync (recorded {}, found {})",
            paths.slug(),
            short_hash(base),
            short_hash(&local)
        );

        if !options.dry_run {
            let repository = self.normalizer.strip_frontmatter(&current.content);
            let conflict = ConflictFile {
                slug: paths.slug(),
                repository: &repository,
                note: pulled_body,
            };
            self.state.write_conflict(paths, &conflict).await?;
        }

        if options.force {
            warn!("{}: --force given; note's version replaces local edits", paths.slug());
            return Ok(());
        }

        Err(PipelineError::conflict(
            paths.markdown(),
            format!(
                "local edits since the last sync; resolve {} or pull with --force",
                paths.conflict()
            ),
        ))
    }

    /// Keeps any frontmatter the repository copy already had and, when
    /// enabled, refreshes the platform-derived fields.
    fn compose(
        &self,
        slug: &str,
        meta: &ArticleMetadata,
        draft: &NoteDraft,
        existing: Option<&RemoteFile>,
        body: &str,
    ) -> String {
        let mut frontmatter = match existing.map(|file| self.frontmatter.split(&file.content)) {
            Some(Ok((frontmatter, _))) => frontmatter,
            Some(Err(e)) => {
                warn!("{}: dropping unreadable frontmatter ({})", slug, e);
                Frontmatter::default()
            }
            None => Frontmatter::default(),
        };

        if self.config.sync.pull_frontmatter {
            let title = if draft.title.trim().is_empty() {
                meta.title.as_str()
            } else {
                draft.title.as_str()
            };
            frontmatter.insert("title", title);
            frontmatter.insert("note_id", meta.note_id.as_str());
            frontmatter.insert("slug", slug);
            if let Some(updated_at) = &draft.updated_at {
                frontmatter.insert("updated_at", updated_at.as_str());
            }
        }

        let mut markdown = self.frontmatter.render(&frontmatter, body);
        if !markdown.ends_with('\n') {
            markdown.push('\n');
        }
        markdown
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
