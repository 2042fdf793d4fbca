//! `chainevents query`: historical query, one decoded JSON event per line.

use anyhow::{anyhow, Result};
use chainevents_core::{DecodeLog, EventFilterer, FilterCriteria, LogSource};
use serde::Serialize;
use std::io::Write;
use tracing::info;

pub async fn run<T, S, W>(
    filterer: &EventFilterer<S>,
    criteria: FilterCriteria,
    out: &mut W,
) -> Result<usize>
where
    T: DecodeLog + Serialize,
    S: LogSource + 'static,
    W: Write,
{
    let event = criteria.event().to_string();
    let mut events = filterer.query::<T>(criteria).await?;

    let mut count = 0;
    while events.advance() {
        if let Some(decoded) = events.current() {
            writeln!(out, "{}", serde_json::to_string(decoded)?)?;
            count += 1;
        }
    }
    out.flush()?;

    if let Some(err) = events.error() {
        return Err(anyhow!(err.clone()).context(format!("query stopped after {count} events")));
    }
    events.close();
    info!(%event, count, "query complete");
    Ok(count)
}
