// file: src/sync/mod.rs
// description: push and pull workflows module exports
// reference: internal module structure

#[cfg(test)]
pub(crate) mod fakes;
pub mod orchestrator;
pub mod progress;
pub mod pull;
pub mod push;
pub mod state;

pub use orchestrator::SyncOrchestrator;
pub use progress::{ProgressTracker, SyncStats};
pub use pull::{ArticlePuller, PullOptions, PullOutcome, PullReport};
pub use push::{ArticlePusher, PushOptions, PushReport};
pub use state::{ConflictFile, StateRecorder};
