// file: src/utils/telemetry.rs
// description: run and per-article timing for sync operations
// reference: tracing-based timing spans

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Times one sync run and the individual articles inside it.
pub struct OperationTimer {
    operation: String,
    start: Instant,
    articles: Mutex<Vec<(String, Duration)>>,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
            articles: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn checkpoint(&self, message: &str) {
        debug!(
            "[{}] {} after {:.2}s",
            self.operation,
            message,
            self.elapsed().as_secs_f64()
        );
    }

    pub fn record(&self, slug: &str, elapsed: Duration) {
        debug!("[{}] {} took {:.2}s", self.operation, slug, elapsed.as_secs_f64());
        if let Ok(mut articles) = self.articles.lock() {
            articles.push((slug.to_string(), elapsed));
        }
    }

    pub fn slowest(&self) -> Option<(String, Duration)> {
        self.articles
            .lock()
            .ok()?
            .iter()
            .max_by_key(|(_, elapsed)| *elapsed)
            .cloned()
    }

    pub fn warn_if_slow(&self, threshold: Duration) {
        let elapsed = self.elapsed();
        if elapsed <= threshold {
            return;
        }

        match self.slowest() {
            Some((slug, slowest)) => warn!(
                "{} took {:.2}s (threshold {:.0}s); slowest article {} at {:.2}s",
                self.operation,
                elapsed.as_secs_f64(),
                threshold.as_secs_f64(),
                slug,
                slowest.as_secs_f64()
            ),
            None => warn!(
                "{} took {:.2}s (threshold {:.0}s)",
                self.operation,
                elapsed.as_secs_f64(),
                threshold.as_secs_f64()
            ),
        }
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Finished {}: {} article(s) in {:.2}s",
            self.operation,
            count,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}
