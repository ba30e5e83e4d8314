//! Attribution resolver — walks an ordered list of parameter sources and
//! keeps, per field, the first non-blank value found.
//!
//! Source precedence (custom parameters, then deep-link query, then deep-link
//! fragment) outranks scheme precedence, which only orders names inside one
//! source. Fields are resolved independently, so campaign and medium may come
//! from different sources in the same call.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use piano_core::{AttributionResult, DispatcherConfig, EventFacets, EventPayload};

use crate::scheme::{AttributionField, ParameterScheme};
use crate::url_params::{parse_fragment, parse_query};

/// Source literal used when no `utm_source` is found.
pub const BATCH_SOURCE: &str = "Batch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CustomParameters,
    DeepLinkQuery,
    DeepLinkFragment,
}

/// One candidate mapping of attribution parameters.
#[derive(Debug, Clone)]
pub struct ParameterSource<'a> {
    pub kind: SourceKind,
    pub params: Cow<'a, HashMap<String, String>>,
}

/// Candidate sources for `payload`, highest precedence first. Absent or empty
/// sources are left out.
pub fn attribution_sources(payload: &EventPayload) -> Vec<ParameterSource<'_>> {
    let mut sources = Vec::with_capacity(3);

    if let Some(custom) = payload.custom_parameters.as_ref() {
        sources.push(ParameterSource {
            kind: SourceKind::CustomParameters,
            params: Cow::Borrowed(custom),
        });
    }
    if let Some(deep_link) = payload.deep_link.as_deref() {
        sources.push(ParameterSource {
            kind: SourceKind::DeepLinkQuery,
            params: Cow::Owned(parse_query(deep_link)),
        });
        sources.push(ParameterSource {
            kind: SourceKind::DeepLinkFragment,
            params: Cow::Owned(parse_fragment(deep_link)),
        });
    }

    sources.retain(|source| !source.params.is_empty());
    sources
}

/// Resolves campaign/source/medium/content for a payload.
#[derive(Debug, Clone, Copy)]
pub struct AttributionResolver {
    scheme: ParameterScheme,
    utm_tracking_enabled: bool,
}

impl AttributionResolver {
    pub fn new(config: &DispatcherConfig) -> Self {
        Self {
            scheme: ParameterScheme::new(config.scheme_precedence),
            utm_tracking_enabled: config.utm_tracking_enabled,
        }
    }

    pub fn resolve(&self, payload: &EventPayload, facets: &EventFacets) -> AttributionResult {
        let sources = if self.utm_tracking_enabled {
            attribution_sources(payload)
        } else {
            Vec::new()
        };

        let campaign = self.resolve_field(AttributionField::Campaign, &sources);
        let medium = self.resolve_field(AttributionField::Medium, &sources);
        let source = self.resolve_field(AttributionField::Source, &sources);
        let content = self.resolve_field(AttributionField::Content, &sources);

        AttributionResult {
            campaign: campaign
                .unwrap_or_else(|| payload.tracking_id().unwrap_or_default().to_string()),
            source: source.unwrap_or_else(|| BATCH_SOURCE.to_string()),
            medium: medium.unwrap_or_else(|| facets.default_medium().to_string()),
            content,
        }
    }

    /// First non-blank value for `field` across `sources`, in order.
    pub fn resolve_field(
        &self,
        field: AttributionField,
        sources: &[ParameterSource<'_>],
    ) -> Option<String> {
        sources.iter().find_map(|source| {
            let value = self.scheme.lookup(field, &source.params)?;
            trace!(field = ?field, source = ?source.kind, value = %value, "attribution resolved");
            Some(value)
        })
    }
}

/// Convenience wrapper around [`AttributionResolver`].
pub fn resolve(
    payload: &EventPayload,
    facets: &EventFacets,
    config: &DispatcherConfig,
) -> AttributionResult {
    AttributionResolver::new(config).resolve(payload, facets)
}
