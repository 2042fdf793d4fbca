//! # chainevents-core
//!
//! The event log consumption pattern shared by every ChainEvents binding:
//! declarative [`FilterCriteria`], the [`LogSource`] collaborator, typed
//! decoding, a pull-based [`EventIterator`] for historical queries and a
//! push-based [`SubscriptionLoop`] for live feeds.
//!
//! [`EventFilterer`] ties them together behind `query`, `watch` and `parse`.

pub mod decoder;
pub mod error;
pub mod filter;
pub mod filterer;
pub mod iterator;
pub mod log;
pub mod memory;
pub mod signature;
pub mod source;
pub mod subscription;

pub use decoder::{decode_event, ContractEvent, DecodeLog, Decoded};
pub use error::{DecodeError, EventError, FilterError, SinkClosed, SourceError};
pub use filter::{BlockRange, FilterCriteria, TopicSet};
pub use filterer::EventFilterer;
pub use iterator::EventIterator;
pub use log::{LogPosition, RawLog};
pub use memory::MemoryLogSource;
pub use signature::{event_topic, hashed_topic, keccak256, IntoTopic};
pub use source::{live_feed, FeedSender, HistoricalLogs, LiveFeed, LogSource, ReleaseHandle};
pub use subscription::{EventSink, Subscription, SubscriptionLoop};
