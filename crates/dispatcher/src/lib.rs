//! Batch → Piano Analytics event dispatcher.
//!
//! Batch SDK events (notification displayed/opened, in-app shown/clicked, …)
//! are translated into Piano on-site ad events and Piano custom events that
//! carry campaign attribution.
//!
//! # Modules
//!
//! - [`classifier`] — event type → surface, impression/click, custom event name
//! - [`builders`] — on-site ad and custom event construction
//! - [`dispatcher`] — toggles and the per-event dispatch entry point
//! - [`adaptor`] — JSON rendering for the Piano collection format

pub mod adaptor;
pub mod builders;
pub mod classifier;
pub mod dispatcher;

pub use adaptor::{EventAdaptor, PianoAdaptorConfig, PianoJsonAdaptor};
pub use builders::{build_custom_event, build_on_site_ad_event};
pub use classifier::{classify, classify_tag};
pub use dispatcher::{PianoDispatcher, DISPATCHER_NAME, DISPATCHER_VERSION};
