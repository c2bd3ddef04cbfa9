//! Batch processing over a flat-file product queue.
//!
//! Resumability contract: a queue entry is removed (and the file
//! rewritten) only after its entire per-product pipeline succeeded, so a
//! crash mid-entry leaves that entry queued for the next run. The counter
//! file is cosmetic history — corruption resets it, never aborts.

use crate::error::SyncError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Writing exactly this (trimmed) into the pause file stops the batch
/// after the entry currently in flight.
pub const PAUSE_SENTINEL: &str = "-";

/// What to do when one entry's pipeline fails hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole batch (the failed entry stays queued).
    #[default]
    Abort,
    /// Log, keep the entry in the queue file, continue with the next one.
    Skip,
    /// Re-run the entry up to N extra times, then abort.
    Retry(u32),
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => match other.strip_prefix("retry:") {
                Some(n) => n
                    .parse()
                    .map(FailurePolicy::Retry)
                    .map_err(|_| format!("bad retry count in failure policy {other:?}")),
                None => Err(format!(
                    "unknown failure policy {other:?} (expected abort, skip or retry:N)"
                )),
            },
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
            FailurePolicy::Retry(n) => write!(f, "retry:{n}"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for FailurePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchState {
    pub processed: u64,
    pub elapsed: Duration,
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

pub fn parse_elapsed(raw: &str) -> Option<Duration> {
    let mut parts = raw.trim().splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

/// Reload the counter file. A corrupt or missing counter loses history,
/// nothing more.
pub fn load_state(path: &Path) -> BatchState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return BatchState::default(),
    };
    let mut lines = raw.lines();
    let processed = lines.next().and_then(|l| l.trim().parse().ok());
    let elapsed = lines.next().and_then(parse_elapsed);
    match (processed, elapsed) {
        (Some(processed), Some(elapsed)) => BatchState { processed, elapsed },
        _ => {
            warn!(
                "counter file {} is unreadable; starting the count from zero",
                path.display()
            );
            BatchState::default()
        }
    }
}

pub fn save_state(path: &Path, state: &BatchState) -> Result<(), SyncError> {
    fs::write(
        path,
        format!("{}\n{}\n", state.processed, format_elapsed(state.elapsed)),
    )?;
    Ok(())
}

/// The remaining product names, one per non-blank line. A missing queue
/// file is the one file error that kills the batch.
pub fn load_queue(path: &Path) -> Result<Vec<String>, SyncError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        SyncError::Config(format!("queue file {} unreadable: {e}", path.display()))
    })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn save_queue<'a, I>(path: &Path, entries: I) -> Result<(), SyncError>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut content = entries
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

/// Operator-controlled graceful stop, checked only between entries.
pub fn pause_requested(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => content.trim() == PAUSE_SENTINEL,
        Err(_) => false,
    }
}

/// The full per-product pipeline the runner drives for each queue entry.
#[async_trait::async_trait]
pub trait ProductPipeline {
    async fn process(&mut self, product: &str) -> Result<(), SyncError>;
}

pub struct BatchRunner {
    queue_file: PathBuf,
    counter_file: PathBuf,
    pause_file: PathBuf,
    policy: FailurePolicy,
}

enum Outcome {
    Done,
    Skipped,
}

impl BatchRunner {
    pub fn new(
        queue_file: PathBuf,
        counter_file: PathBuf,
        pause_file: PathBuf,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            queue_file,
            counter_file,
            pause_file,
            policy,
        }
    }

    pub async fn run(&self, pipeline: &mut dyn ProductPipeline) -> Result<BatchState, SyncError> {
        let mut state = load_state(&self.counter_file);
        let mut queue = load_queue(&self.queue_file)?;
        info!(
            "batch started: {} entries queued, {} already processed, policy {}",
            queue.len(),
            state.processed,
            self.policy
        );

        let base_elapsed = state.elapsed;
        let started = Instant::now();
        // Entries that failed under the skip policy; they stay in the file.
        let mut kept: Vec<String> = Vec::new();

        while let Some(product) = queue.first().cloned() {
            match self.process_one(pipeline, &product).await? {
                Outcome::Done => {
                    queue.remove(0);
                    save_queue(&self.queue_file, kept.iter().chain(queue.iter()))?;
                    state.processed += 1;
                    state.elapsed = base_elapsed + started.elapsed();
                    save_state(&self.counter_file, &state)?;
                    info!(
                        "finished {product:?} ({} done, {})",
                        state.processed,
                        format_elapsed(state.elapsed)
                    );
                }
                Outcome::Skipped => {
                    kept.push(queue.remove(0));
                }
            }
            if pause_requested(&self.pause_file) {
                info!("pause sentinel found; stopping after the current entry");
                break;
            }
        }
        Ok(state)
    }

    async fn process_one(
        &self,
        pipeline: &mut dyn ProductPipeline,
        product: &str,
    ) -> Result<Outcome, SyncError> {
        let attempts = match self.policy {
            FailurePolicy::Retry(extra) => extra + 1,
            _ => 1,
        };
        let mut last_error = None;
        for attempt in 1..=attempts {
            match pipeline.process(product).await {
                Ok(()) => return Ok(Outcome::Done),
                Err(e) => {
                    warn!("pipeline failed for {product:?} (attempt {attempt}/{attempts}): {e}");
                    last_error = Some(e);
                }
            }
        }
        let error = last_error.expect("at least one attempt ran");
        match self.policy {
            FailurePolicy::Skip => {
                warn!("skipping {product:?}; the entry stays in the queue file");
                Ok(Outcome::Skipped)
            }
            _ => Err(error),
        }
    }
}
