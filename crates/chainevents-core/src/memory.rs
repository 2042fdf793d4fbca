//! In-process `LogSource` backed by a log history plus live feeds.
//!
//! Used by tests and by tooling that replays logs from a file. Failure
//! injection and release counters make the loop's exit paths observable.

use crate::error::SourceError;
use crate::filter::FilterCriteria;
use crate::log::RawLog;
use crate::source::{live_feed, FeedSender, HistoricalLogs, LiveFeed, LogSource, ReleaseHandle};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

#[derive(Default)]
struct Inner {
    history: Vec<RawLog>,
    feeds: Vec<(FilterCriteria, FeedSender)>,
    next_query_error: Option<SourceError>,
    next_subscribe_error: Option<SourceError>,
}

#[derive(Clone, Default)]
pub struct MemoryLogSource {
    inner: Arc<Mutex<Inner>>,
    feed_releases: Arc<AtomicUsize>,
    query_releases: Arc<AtomicUsize>,
}

impl MemoryLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logs(logs: impl IntoIterator<Item = RawLog>) -> Self {
        let source = Self::new();
        for log in logs {
            source.insert(log);
        }
        source
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the data usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a log to the history, keeping on-chain order.
    pub fn insert(&self, log: RawLog) {
        let mut inner = self.lock();
        let at = inner
            .history
            .partition_point(|existing| existing.position() <= log.position());
        inner.history.insert(at, log);
    }

    /// Add a log to the history and push it to every live feed it matches.
    /// Returns the number of feeds that received it.
    pub fn publish(&self, log: RawLog) -> usize {
        self.insert(log.clone());
        let mut inner = self.lock();
        inner.feeds.retain(|(_, tx)| !tx.is_closed());
        let mut delivered = 0;
        for (criteria, tx) in &inner.feeds {
            if criteria.matches(&log) && tx.send(log.clone()).is_ok() {
                delivered += 1;
            }
        }
        trace!(position = %log.position(), delivered, "published log");
        delivered
    }

    /// Report `err` on every open feed.
    pub fn fail_feeds(&self, err: SourceError) {
        for (_, tx) in &self.lock().feeds {
            tx.fail(err.clone());
        }
    }

    /// Close every open feed (normal end of stream).
    pub fn close_feeds(&self) {
        self.lock().feeds.clear();
    }

    pub fn fail_next_query(&self, err: SourceError) {
        self.lock().next_query_error = Some(err);
    }

    pub fn fail_next_subscribe(&self, err: SourceError) {
        self.lock().next_subscribe_error = Some(err);
    }

    /// Feeds whose consumer is still attached.
    pub fn live_feeds(&self) -> usize {
        self.lock().feeds.iter().filter(|(_, tx)| !tx.is_closed()).count()
    }

    /// Number of times a live feed has been released.
    pub fn releases(&self) -> usize {
        self.feed_releases.load(Ordering::SeqCst)
    }

    /// Number of times a historical result has been released.
    pub fn query_releases(&self) -> usize {
        self.query_releases.load(Ordering::SeqCst)
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }
}

impl std::fmt::Debug for MemoryLogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLogSource")
            .field("history", &self.history_len())
            .field("live_feeds", &self.live_feeds())
            .field("releases", &self.releases())
            .finish()
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn query_logs(&self, criteria: &FilterCriteria) -> Result<HistoricalLogs, SourceError> {
        let mut inner = self.lock();
        if let Some(err) = inner.next_query_error.take() {
            return Err(err);
        }
        let logs: Vec<RawLog> = inner
            .history
            .iter()
            .filter(|log| criteria.matches(log))
            .cloned()
            .collect();
        let counter = Arc::clone(&self.query_releases);
        Ok(HistoricalLogs::new(logs).with_release(ReleaseHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })))
    }

    async fn subscribe_logs(&self, criteria: &FilterCriteria) -> Result<LiveFeed, SourceError> {
        let mut inner = self.lock();
        if let Some(err) = inner.next_subscribe_error.take() {
            return Err(err);
        }
        let counter = Arc::clone(&self.feed_releases);
        let (tx, feed) = live_feed(ReleaseHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        inner.feeds.push((criteria.clone(), tx));
        Ok(feed)
    }
}
