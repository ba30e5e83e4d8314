//! Shared model for the Batch → Piano event dispatcher: payloads, event
//! types, attribution results, outgoing events, configuration and errors.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod types;

pub use config::{DispatcherConfig, SchemePrecedence};
pub use error::{DispatchError, DispatchResult};
pub use event_bus::{EventSink, NoOpSink};
pub use types::{
    AttributionResult, EventFacets, EventPayload, PianoEvent, PropertyValue, RawEventType,
};
