//! Scanner engine: book lookups, message timers and decode sources.
mod dispatch;
mod engine;
mod expiry;
mod lookup;
mod sink;
mod source;
mod types;
mod volume;

pub use dispatch::{DispatchOutcome, LookupDispatcher, RetryPolicy};
pub use engine::{EngineError, EngineHandle};
pub use expiry::MessageTimer;
pub use lookup::{BookLookup, LookupSettings, ReqwestBookLookup, DEFAULT_ENDPOINT};
pub use sink::{ChannelEventSink, EventSink};
pub use source::{DecodeSource, LineDecodeSource, SourceError};
pub use types::{EngineEvent, FailureKind, LookupError, LookupResult};
pub use volume::project_volumes;
