//! `chainevents watch`: live subscription, one decoded JSON event per line
//! until the feed ends or `shutdown` resolves.

use anyhow::Result;
use chainevents_core::{DecodeLog, EventFilterer, FilterCriteria, LogSource};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run<T, S, W, F>(
    filterer: &EventFilterer<S>,
    criteria: FilterCriteria,
    capacity: usize,
    out: &mut W,
    shutdown: F,
) -> Result<usize>
where
    T: DecodeLog + Serialize,
    S: LogSource + 'static,
    W: Write,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::channel::<T>(capacity.max(1));
    let subscription = filterer.watch::<T, _>(criteria, tx).await?;
    info!(subscription = subscription.label(), "watching");

    tokio::pin!(shutdown);
    let mut count = 0;
    let interrupted = loop {
        tokio::select! {
            _ = &mut shutdown => break true,
            next = rx.recv() => match next {
                Some(event) => {
                    writeln!(out, "{}", serde_json::to_string(&event)?)?;
                    out.flush()?;
                    count += 1;
                }
                None => break false,
            },
        }
    };

    if interrupted {
        info!(count, "interrupted, cancelling subscription");
        subscription.cancel().await?;
    } else {
        subscription.wait().await?;
    }
    Ok(count)
}
