//! Attribution resolution for Batch events: deep-link parameter parsing, the
//! `at_*`/`utm_*` parameter scheme and the per-field resolver.
//!
//! # Modules
//!
//! - [`url_params`] — query and fragment extraction from deep links
//! - [`scheme`] — semantic field → accepted parameter names
//! - [`resolver`] — ordered source scan with defaults

pub mod resolver;
pub mod scheme;
pub mod url_params;

pub use resolver::{attribution_sources, resolve, AttributionResolver, SourceKind, BATCH_SOURCE};
pub use scheme::{AttributionField, ParameterScheme};
pub use url_params::{parse_fragment, parse_query};
