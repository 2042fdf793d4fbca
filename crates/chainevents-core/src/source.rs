//! `LogSource`: the RPC collaborator that answers historical queries and
//! opens live log feeds.
//!
//! Both operations hand back a [`ReleaseHandle`] that frees whatever the
//! source allocated (a node-side filter, a subscription id). Releasing is
//! idempotent and also happens on drop, so it runs exactly once.

use crate::error::SourceError;
use crate::filter::FilterCriteria;
use crate::log::RawLog;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One-shot release of source-side resources.
pub struct ReleaseHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ReleaseHandle {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Run the release action. Returns `true` only on the first call.
    pub fn release(&mut self) -> bool {
        match self.release.take() {
            Some(release) => {
                release();
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Result of a historical query: matching logs in on-chain order.
#[derive(Debug)]
pub struct HistoricalLogs {
    pub logs: Vec<RawLog>,
    pub release: ReleaseHandle,
}

impl HistoricalLogs {
    pub fn new(logs: Vec<RawLog>) -> Self {
        Self {
            logs,
            release: ReleaseHandle::noop(),
        }
    }

    pub fn with_release(mut self, release: ReleaseHandle) -> Self {
        self.release = release;
        self
    }
}

/// An open live feed.
///
/// `logs` carries matching records in arrival order; `errors` carries at
/// most one terminal fault. The feed ends when `logs` is closed.
#[derive(Debug)]
pub struct LiveFeed {
    pub logs: mpsc::UnboundedReceiver<RawLog>,
    pub errors: mpsc::UnboundedReceiver<SourceError>,
    pub release: ReleaseHandle,
}

/// Producer half of a [`LiveFeed`], held by the source.
#[derive(Debug, Clone)]
pub struct FeedSender {
    logs: mpsc::UnboundedSender<RawLog>,
    errors: mpsc::UnboundedSender<SourceError>,
}

impl FeedSender {
    /// Push a record; fails with `Closed` once the consumer is gone.
    pub fn send(&self, log: RawLog) -> Result<(), SourceError> {
        self.logs.send(log).map_err(|_| SourceError::Closed)
    }

    /// Report a terminal fault on the feed.
    pub fn fail(&self, err: SourceError) {
        let _ = self.errors.send(err);
    }

    pub fn is_closed(&self) -> bool {
        self.logs.is_closed()
    }
}

/// Create a connected feed pair.
pub fn live_feed(release: ReleaseHandle) -> (FeedSender, LiveFeed) {
    let (log_tx, log_rx) = mpsc::unbounded_channel();
    let (err_tx, err_rx) = mpsc::unbounded_channel();
    (
        FeedSender {
            logs: log_tx,
            errors: err_tx,
        },
        LiveFeed {
            logs: log_rx,
            errors: err_rx,
            release,
        },
    )
}

/// The RPC collaborator.
///
/// Implementations must apply [`FilterCriteria::matches`] semantics: a
/// record is returned or delivered iff the criteria match it.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch every matching log in the criteria's historical range,
    /// ordered by block number then log index.
    async fn query_logs(&self, criteria: &FilterCriteria) -> Result<HistoricalLogs, SourceError>;

    /// Open a live feed of logs matching the criteria.
    async fn subscribe_logs(&self, criteria: &FilterCriteria) -> Result<LiveFeed, SourceError>;
}

#[async_trait]
impl<S: LogSource + ?Sized> LogSource for Arc<S> {
    async fn query_logs(&self, criteria: &FilterCriteria) -> Result<HistoricalLogs, SourceError> {
        (**self).query_logs(criteria).await
    }

    async fn subscribe_logs(&self, criteria: &FilterCriteria) -> Result<LiveFeed, SourceError> {
        (**self).subscribe_logs(criteria).await
    }
}
