// file: src/sync/orchestrator.rs
// description: runs push or pull over many articles with one platform session
// reference: bounded concurrent processing with buffer_unordered

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::remote::{ContentFetcher, Credentials, PlatformClient, RepositoryWriter};
use crate::sync::progress::{ProgressTracker, SyncStats};
use crate::sync::pull::{ArticlePuller, PullOptions, PullOutcome, PullReport};
use crate::sync::push::{ArticlePusher, PushOptions, PushReport};
use crate::utils::OperationTimer;
use crate::utils::logging::{format_error, format_skipped, format_success, format_warning};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const SLOW_RUN: Duration = Duration::from_secs(60);

pub struct SyncOrchestrator<F, P> {
    fetcher: F,
    platform: P,
    config: Config,
    show_progress: bool,
    colored: bool,
}

impl<F, P> SyncOrchestrator<F, P>
where
    F: ContentFetcher,
    P: PlatformClient,
{
    pub fn new(fetcher: F, platform: P, config: Config) -> Self {
        Self {
            fetcher,
            platform,
            config,
            show_progress: true,
            colored: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn tracker(&self, total: usize) -> ProgressTracker {
        if self.show_progress {
            ProgressTracker::with_color(total, self.colored)
        } else {
            ProgressTracker::hidden()
        }
    }

    fn workers(&self) -> usize {
        self.config.sync.parallel_workers.max(1)
    }

    /// `state` receives each article's updated `meta.json`; pass `None` when
    /// the repository is read-only for this run.
    pub async fn push_all<W>(
        &self,
        state: Option<&W>,
        credentials: &Credentials,
        slugs: &[String],
        options: PushOptions,
    ) -> Result<SyncStats>
    where
        W: RepositoryWriter,
    {
        if slugs.is_empty() {
            warn!("No articles to push");
            return Ok(SyncStats::new());
        }

        let timer = OperationTimer::new("push");
        let session = self.platform.login(credentials).await?;
        timer.checkpoint("signed in");

        let pusher = ArticlePusher::new(&self.fetcher, &self.platform, state, &self.config);
        let progress = self.tracker(slugs.len());

        let results: Vec<Result<()>> = stream::iter(slugs)
            .map(|slug| {
                let pusher = &pusher;
                let session = &session;
                let timer = &timer;
                let progress = &progress;
                async move {
                    let started = Instant::now();
                    let result = pusher.push(session, slug, options).await;
                    timer.record(slug, started.elapsed());
                    settle_push(progress, slug, result)
                }
            })
            .buffer_unordered(self.workers())
            .collect()
            .await;

        self.finish(progress, timer, results)
    }

    pub async fn pull_all<W>(
        &self,
        writer: &W,
        credentials: &Credentials,
        slugs: &[String],
        options: PullOptions,
    ) -> Result<SyncStats>
    where
        W: RepositoryWriter,
    {
        if slugs.is_empty() {
            warn!("No articles to pull");
            return Ok(SyncStats::new());
        }

        let timer = OperationTimer::new("pull");
        let session = self.platform.login(credentials).await?;
        timer.checkpoint("signed in");

        let puller = ArticlePuller::new(&self.fetcher, &self.platform, writer, &self.config);
        let progress = self.tracker(slugs.len());

        // Each slug writes a distinct path, so commits may run concurrently.
        let results: Vec<Result<()>> = stream::iter(slugs)
            .map(|slug| {
                let puller = &puller;
                let session = &session;
                let timer = &timer;
                let progress = &progress;
                async move {
                    let started = Instant::now();
                    let result = puller.pull(session, slug, options).await;
                    timer.record(slug, started.elapsed());
                    settle_pull(progress, slug, result)
                }
            })
            .buffer_unordered(self.workers())
            .collect()
            .await;

        self.finish(progress, timer, results)
    }

    /// Every failure was logged as it happened; the first one to complete
    /// becomes the run's error.
    fn finish(
        &self,
        progress: ProgressTracker,
        timer: OperationTimer,
        results: Vec<Result<()>>,
    ) -> Result<SyncStats> {
        let first_error = results.into_iter().find_map(Result::err);
        let stats = progress.get_stats();
        progress.finish();

        timer.warn_if_slow(SLOW_RUN);
        timer.finish_with_count(stats.total());
        log_final_stats(&stats);

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

/// Counts and logs one finished push while the rest of the run continues.
fn settle_push(progress: &ProgressTracker, slug: &str, result: Result<PushReport>) -> Result<()> {
    match result {
        Ok(report) => {
            progress.inc_synced(report.html.len() as u64);
            log_pushed(&report);
            Ok(())
        }
        Err(e) => settle_failure(progress, slug, e),
    }
}

fn settle_pull(progress: &ProgressTracker, slug: &str, result: Result<PullReport>) -> Result<()> {
    match result {
        Ok(report) => {
            log_pulled(progress, report);
            Ok(())
        }
        Err(e) => settle_failure(progress, slug, e),
    }
}

fn settle_failure(progress: &ProgressTracker, slug: &str, e: PipelineError) -> Result<()> {
    progress.inc_failed();
    error!("{}", format_error(&format!("{}: {}", slug, e)));
    Err(e)
}

fn log_pushed(report: &PushReport) {
    let verb = if report.sent { "pushed" } else { "would push" };
    info!(
        "{}",
        format_success(&format!("{} {} -> note {}", verb, report.slug, report.note_id))
    );
    if !report.warnings.is_empty() {
        info!(
            "{}",
            format_warning(&format!(
                "{}: {} unsupported construct(s)",
                report.slug,
                report.warnings.len()
            ))
        );
    }
}

fn log_pulled(progress: &ProgressTracker, report: PullReport) {
    match report.outcome {
        PullOutcome::Committed { commit_sha } => {
            progress.inc_synced(report.markdown.len() as u64);
            info!(
                "{}",
                format_success(&format!(
                    "pulled {} ({})",
                    report.path,
                    commit_sha.as_deref().unwrap_or("no sha")
                ))
            );
        }
        PullOutcome::DryRun => {
            progress.inc_synced(report.markdown.len() as u64);
            info!("{}", format_success(&format!("would pull {}", report.path)));
        }
        PullOutcome::Unchanged => {
            progress.inc_unchanged();
            info!("{}", format_skipped(&format!("{} unchanged", report.path)));
        }
    }
}

fn log_final_stats(stats: &SyncStats) {
    info!("=== Sync Summary ===");
    info!("Synced: {}", stats.articles_synced);
    info!("Unchanged: {}", stats.articles_unchanged);
    info!("Failed: {}", stats.articles_failed);
    info!("Success rate: {:.1}%", stats.success_rate());
}
