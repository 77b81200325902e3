// file: src/sync/progress.rs
// description: progress tracking and statistics reporting for sync runs
// reference: uses indicatif for progress bars and tracks per-article outcomes

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    pub articles_synced: usize,
    pub articles_unchanged: usize,
    pub articles_failed: usize,
    pub bytes_transferred: u64,
    pub duration_secs: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.articles_synced + self.articles_unchanged + self.articles_failed
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        ((self.articles_synced + self.articles_unchanged) as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    synced: Arc<AtomicUsize>,
    unchanged: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    bytes: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, total as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    /// Tracks counts without drawing anything.
    pub fn hidden() -> Self {
        Self::from_bars(ProgressBar::hidden(), ProgressBar::hidden())
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            synced: Arc::new(AtomicUsize::new(0)),
            unchanged: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            bytes: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_synced(&self, bytes: u64) {
        self.synced.fetch_add(1, Ordering::SeqCst);
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Sync complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> SyncStats {
        SyncStats {
            articles_synced: self.synced.load(Ordering::SeqCst),
            articles_unchanged: self.unchanged.load(Ordering::SeqCst),
            articles_failed: self.failed.load(Ordering::SeqCst),
            bytes_transferred: self.bytes.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Synced: {} | Unchanged: {} | Failed: {}",
            self.synced.load(Ordering::SeqCst),
            self.unchanged.load(Ordering::SeqCst),
            self.failed.load(Ordering::SeqCst)
        );
        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"
    };
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars(if colored { "█▓▒░" } else { "=>-" }));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}
