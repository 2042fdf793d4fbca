//! `SubscriptionLoop`: forwards a live log feed into a caller-supplied sink.
//!
//! The loop waits on three things at once: the cancel signal, the next raw
//! record, and the feed's error channel. Polling is biased in that order, so
//! a record already queued ahead of a fault is forwarded before the fault
//! ends the loop. A pending send to the sink keeps racing cancel and the
//! error channel, which lets a caller cancel a blocked forward.
//!
//! Every exit path releases the feed exactly once.

use crate::decoder::DecodeLog;
use crate::error::{EventError, SinkClosed};
use crate::source::LiveFeed;
use async_trait::async_trait;
use std::marker::PhantomData;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Destination for decoded events.
///
/// `deliver` may wait (backpressure); returning `SinkClosed` ends the
/// subscription cleanly.
#[async_trait]
pub trait EventSink<T: Send>: Send {
    async fn deliver(&mut self, item: T) -> Result<(), SinkClosed>;
}

#[async_trait]
impl<T: Send> EventSink<T> for mpsc::Sender<T> {
    async fn deliver(&mut self, item: T) -> Result<(), SinkClosed> {
        self.send(item).await.map_err(|_| SinkClosed)
    }
}

#[async_trait]
impl<T: Send> EventSink<T> for mpsc::UnboundedSender<T> {
    async fn deliver(&mut self, item: T) -> Result<(), SinkClosed> {
        self.send(item).map_err(|_| SinkClosed)
    }
}

pub struct SubscriptionLoop<T, K> {
    feed: LiveFeed,
    sink: K,
    cancel: oneshot::Receiver<()>,
    label: String,
    _event: PhantomData<fn() -> T>,
}

impl<T, K> SubscriptionLoop<T, K>
where
    T: DecodeLog,
    K: EventSink<T>,
{
    /// `cancel` fires on an explicit send or when its sender is dropped.
    pub fn new(feed: LiveFeed, sink: K, cancel: oneshot::Receiver<()>) -> Self {
        Self {
            feed,
            sink,
            cancel,
            label: String::from("subscription"),
            _event: PhantomData,
        }
    }

    /// Name used in log output.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Drive the feed to completion and release it.
    ///
    /// `Ok(())` covers feed exhaustion, cancellation and a closed sink;
    /// errors are a feed fault or a decode failure.
    pub async fn run(mut self) -> Result<(), EventError> {
        info!(subscription = %self.label, "subscription started");
        let outcome = self.forward().await;

        if self.feed.release.release() {
            debug!(subscription = %self.label, "live feed released");
        }
        match &outcome {
            Ok(()) => info!(subscription = %self.label, "subscription ended"),
            Err(EventError::Decode(e)) => {
                warn!(subscription = %self.label, error = %e, "subscription stopped on undecodable log")
            }
            Err(e) => error!(subscription = %self.label, error = %e, "subscription failed"),
        }
        outcome
    }

    async fn forward(&mut self) -> Result<(), EventError> {
        let Self {
            feed, sink, cancel, label, ..
        } = self;
        let LiveFeed { logs, errors, .. } = feed;
        let mut errors_open = true;

        loop {
            let log = tokio::select! {
                biased;
                _ = &mut *cancel => {
                    debug!(subscription = %label, "cancelled");
                    return Ok(());
                }
                next = logs.recv() => match next {
                    Some(log) => log,
                    // A fault may have been queued just before the close.
                    None => return match errors.try_recv() {
                        Ok(err) => Err(EventError::Feed(err)),
                        Err(_) => Ok(()),
                    },
                },
                err = errors.recv(), if errors_open => match err {
                    Some(err) => return Err(EventError::Feed(err)),
                    None => {
                        errors_open = false;
                        continue;
                    }
                },
            };

            let event = T::decode_log(&log)?;

            let send = sink.deliver(event);
            tokio::pin!(send);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut *cancel => {
                        debug!(subscription = %label, "cancelled during forward");
                        return Ok(());
                    }
                    delivered = &mut send => match delivered {
                        Ok(()) => break,
                        Err(SinkClosed) => {
                            debug!(subscription = %label, "sink closed");
                            return Ok(());
                        }
                    },
                    err = errors.recv(), if errors_open => match err {
                        Some(err) => return Err(EventError::Feed(err)),
                        None => errors_open = false,
                    },
                }
            }
        }
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle cancels the loop; use [`wait`](Self::wait) to observe
/// the loop's terminal result.
#[derive(Debug)]
pub struct Subscription {
    cancel: Option<oneshot::Sender<()>>,
    done: JoinHandle<Result<(), EventError>>,
    label: String,
}

impl Subscription {
    /// Spawn a [`SubscriptionLoop`] on the Tokio runtime.
    pub fn spawn<T, K>(feed: LiveFeed, sink: K, label: impl Into<String>) -> Self
    where
        T: DecodeLog,
        K: EventSink<T> + 'static,
    {
        let label = label.into();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = SubscriptionLoop::<T, K>::new(feed, sink, cancel_rx).with_label(label.clone());
        Self {
            cancel: Some(cancel_tx),
            done: tokio::spawn(task.run()),
            label,
        }
    }

    /// Ask the loop to stop. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.done.is_finished()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the loop's terminal result without cancelling it.
    pub async fn wait(self) -> Result<(), EventError> {
        let Subscription { cancel, done, .. } = self;
        let outcome = done.await;
        drop(cancel);
        outcome.map_err(|e| EventError::Aborted(e.to_string()))?
    }

    /// Cancel and wait for the loop to wind down.
    pub async fn cancel(mut self) -> Result<(), EventError> {
        self.unsubscribe();
        self.wait().await
    }
}
