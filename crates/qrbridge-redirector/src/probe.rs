use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use qrbridge_core::{ReadRepository, StorageError};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Body of a successful keep-alive response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeepAliveReport {
    pub success: bool,
    pub message: String,
    pub timestamp: Timestamp,
}

/// Issues one trivial read against the mapping store.
///
/// Single attempt, no retry and no backoff: the caller only learns pass or fail.
#[derive(Debug)]
pub struct KeepAliveProbe<R> {
    repository: Arc<R>,
}

impl<R> Clone for KeepAliveProbe<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ReadRepository> KeepAliveProbe<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn run(&self) -> Result<KeepAliveReport, StorageError> {
        match self.repository.probe().await {
            Ok(_) => Ok(KeepAliveReport {
                success: true,
                message: "Database keep-alive successful".to_string(),
                timestamp: Timestamp::now(),
            }),
            Err(e) => {
                error!(error = %e, "keep-alive query failed");
                Err(e)
            }
        }
    }

    /// Runs the probe every `period` until the returned task is aborted.
    ///
    /// The first tick fires immediately.
    pub fn spawn_every(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if self.run().await.is_ok() {
                    info!(period_secs = period.as_secs(), "keep-alive probe succeeded");
                }
            }
        })
    }
}
