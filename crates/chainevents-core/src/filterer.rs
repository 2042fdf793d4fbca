//! `EventFilterer`: the query / watch / parse entry points over a `LogSource`.

use crate::decoder::DecodeLog;
use crate::error::{DecodeError, EventError};
use crate::filter::FilterCriteria;
use crate::iterator::EventIterator;
use crate::log::RawLog;
use crate::source::LogSource;
use crate::subscription::{EventSink, Subscription};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Event access for one `LogSource`. Cheap to clone.
#[derive(Debug)]
pub struct EventFilterer<S> {
    source: Arc<S>,
}

impl<S> Clone for EventFilterer<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: LogSource + 'static> EventFilterer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Run a historical query and wrap the result in an iterator.
    ///
    /// The criteria must carry a historical range. A source fault surfaces
    /// here as `EventError::Query`; no partial iterator is returned.
    #[instrument(skip_all, fields(event = criteria.event()))]
    pub async fn query<T: DecodeLog>(
        &self,
        criteria: FilterCriteria,
    ) -> Result<EventIterator<T>, EventError> {
        criteria.require_mode(false)?;
        let logs = self
            .source
            .query_logs(&criteria)
            .await
            .map_err(EventError::Query)?;
        Ok(EventIterator::new(criteria, logs))
    }

    /// Open a live feed and forward decoded events into `sink`.
    ///
    /// The criteria must be in live mode. Subscribe faults surface here as
    /// `EventError::Subscribe` and no loop is started.
    #[instrument(skip_all, fields(event = criteria.event()))]
    pub async fn watch<T, K>(
        &self,
        criteria: FilterCriteria,
        sink: K,
    ) -> Result<Subscription, EventError>
    where
        T: DecodeLog,
        K: EventSink<T> + 'static,
    {
        criteria.require_mode(true)?;
        let feed = self
            .source
            .subscribe_logs(&criteria)
            .await
            .map_err(EventError::Subscribe)?;
        debug!("live feed established");
        Ok(Subscription::spawn::<T, K>(feed, sink, criteria.event()))
    }

    /// Decode a raw log obtained elsewhere (e.g. from a receipt).
    pub fn parse<T: DecodeLog>(&self, log: &RawLog) -> Result<T, DecodeError> {
        T::decode_log(log)
    }
}
