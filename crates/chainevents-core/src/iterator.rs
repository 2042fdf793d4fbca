//! `EventIterator`: a pull-based cursor over a finished historical query.
//!
//! Records are decoded lazily, one per `advance()`, in the order the source
//! returned them. A decode failure freezes the iterator: `advance()` keeps
//! returning `false` and `error()` reports what went wrong.

use crate::decoder::DecodeLog;
use crate::error::DecodeError;
use crate::filter::FilterCriteria;
use crate::log::RawLog;
use crate::source::{HistoricalLogs, ReleaseHandle};
use tracing::{debug, warn};

pub struct EventIterator<T: DecodeLog> {
    criteria: FilterCriteria,
    logs: std::vec::IntoIter<RawLog>,
    current: Option<T>,
    fail: Option<DecodeError>,
    exhausted: bool,
    release: ReleaseHandle,
    /// Set once the failure has been yielded through `Iterator::next`
    error_reported: bool,
}

impl<T: DecodeLog> EventIterator<T> {
    pub fn new(criteria: FilterCriteria, result: HistoricalLogs) -> Self {
        let HistoricalLogs { logs, release } = result;
        debug!(event = criteria.event(), logs = logs.len(), "historical query returned");
        Self {
            criteria,
            logs: logs.into_iter(),
            current: None,
            fail: None,
            exhausted: false,
            release,
            error_reported: false,
        }
    }

    /// Move to the next record. Returns `false` once the results are
    /// exhausted or a record failed to decode; use [`error`](Self::error)
    /// to tell the two apart.
    pub fn advance(&mut self) -> bool {
        if self.exhausted || self.fail.is_some() {
            return false;
        }
        let Some(log) = self.logs.next() else {
            self.current = None;
            self.exhausted = true;
            return false;
        };
        match T::decode_log(&log) {
            Ok(event) => {
                self.current = Some(event);
                true
            }
            Err(err) => {
                warn!(
                    event = self.criteria.event(),
                    position = %log.position(),
                    error = %err,
                    "historical log failed to decode"
                );
                self.current = None;
                self.fail = Some(err);
                false
            }
        }
    }

    /// The event produced by the last successful `advance()`.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Take ownership of the current event.
    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn error(&self) -> Option<&DecodeError> {
        self.fail.as_ref()
    }

    /// Release the resources held for the query. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.release.release() {
            debug!(event = self.criteria.event(), "historical query released");
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Records not yet visited. Zero once the iterator has failed.
    pub fn remaining(&self) -> usize {
        if self.fail.is_some() {
            0
        } else {
            self.logs.len()
        }
    }
}

impl<T: DecodeLog> Iterator for EventIterator<T> {
    type Item = Result<T, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            return self.current.take().map(Ok);
        }
        match &self.fail {
            Some(err) if !self.error_reported => {
                self.error_reported = true;
                Some(Err(err.clone()))
            }
            _ => None,
        }
    }
}

impl<T: DecodeLog> Drop for EventIterator<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: DecodeLog> std::fmt::Debug for EventIterator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventIterator")
            .field("event", &self.criteria.event())
            .field("remaining", &self.logs.len())
            .field("exhausted", &self.exhausted)
            .field("error", &self.fail)
            .finish()
    }
}
