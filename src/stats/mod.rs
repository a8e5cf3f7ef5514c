//! Round statistics.
//!
//! The controller submits a [`RoundSummary`] to a [`StatsQueue`] and moves on; a background
//! recorder task drains the queue into a [`StatsSink`]. Sink failures are logged and dropped.

mod database;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use database::DatabaseSink;

/// Summary of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub player_count: usize,
    pub elapsed_secs: u64,
}

/// Destination for completed-round summaries.
#[async_trait]
pub trait StatsSink: Send + Sync {
    /// Persist one summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary could not be stored.
    async fn record(&self, summary: RoundSummary) -> anyhow::Result<()>;
}

/// Sink used when no database is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl StatsSink for LogSink {
    async fn record(&self, summary: RoundSummary) -> anyhow::Result<()> {
        tracing::info!(
            players = summary.player_count,
            elapsed_secs = summary.elapsed_secs,
            "Round completed"
        );
        Ok(())
    }
}

/// Sending half of the stats queue. Submitting never blocks.
#[derive(Debug, Clone)]
pub struct StatsQueue {
    tx: mpsc::UnboundedSender<RoundSummary>,
}

impl StatsQueue {
    /// Create a queue and the receiver a recorder drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RoundSummary>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn submit(&self, summary: RoundSummary) {
        if self.tx.send(summary).is_err() {
            tracing::warn!(?summary, "Stats recorder is gone, dropping round summary");
        }
    }
}

/// Spawn the background task that hands queued summaries to `sink`, one at a time.
pub fn spawn_recorder(
    sink: Arc<dyn StatsSink>,
    mut rx: mpsc::UnboundedReceiver<RoundSummary>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(summary) = rx.recv().await {
            if let Err(err) = sink.record(summary).await {
                tracing::warn!(?summary, "Failed to record round summary: {err:#}");
            }
        }
        tracing::debug!("Stats recorder stopped");
    })
}
