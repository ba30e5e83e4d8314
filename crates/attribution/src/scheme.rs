//! Attribution parameter scheme — which parameter names feed which semantic
//! attribution field.
//!
//! Two naming schemes coexist: the legacy AT Internet `at_*` names and the
//! Google `utm_*` names. Only `campaign` and `medium` have a legacy alias;
//! `source` and `content` exist solely as `utm_*`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use piano_core::types::non_blank;
use piano_core::SchemePrecedence;

pub const AT_CAMPAIGN: &str = "at_campaign";
pub const AT_MEDIUM: &str = "at_medium";
pub const UTM_CAMPAIGN: &str = "utm_campaign";
pub const UTM_MEDIUM: &str = "utm_medium";
pub const UTM_SOURCE: &str = "utm_source";
pub const UTM_CONTENT: &str = "utm_content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionField {
    Campaign,
    Medium,
    Source,
    Content,
}

impl AttributionField {
    pub const ALL: [AttributionField; 4] = [
        AttributionField::Campaign,
        AttributionField::Medium,
        AttributionField::Source,
        AttributionField::Content,
    ];

    fn legacy_name(&self) -> Option<&'static str> {
        match self {
            AttributionField::Campaign => Some(AT_CAMPAIGN),
            AttributionField::Medium => Some(AT_MEDIUM),
            AttributionField::Source | AttributionField::Content => None,
        }
    }

    fn utm_name(&self) -> &'static str {
        match self {
            AttributionField::Campaign => UTM_CAMPAIGN,
            AttributionField::Medium => UTM_MEDIUM,
            AttributionField::Source => UTM_SOURCE,
            AttributionField::Content => UTM_CONTENT,
        }
    }
}

/// Ordered table of accepted parameter names per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterScheme {
    precedence: SchemePrecedence,
}

impl ParameterScheme {
    pub fn new(precedence: SchemePrecedence) -> Self {
        Self { precedence }
    }

    pub fn precedence(&self) -> SchemePrecedence {
        self.precedence
    }

    /// Accepted names for `field`, highest precedence first.
    pub fn accepted_names(&self, field: AttributionField) -> Vec<&'static str> {
        let utm = field.utm_name();
        match (field.legacy_name(), self.precedence) {
            (Some(legacy), SchemePrecedence::LegacyFirst) => vec![legacy, utm],
            (Some(legacy), SchemePrecedence::UtmFirst) => vec![utm, legacy],
            (None, _) => vec![utm],
        }
    }

    /// First accepted name present in `params` with a non-blank value.
    pub fn lookup(
        &self,
        field: AttributionField,
        params: &HashMap<String, String>,
    ) -> Option<String> {
        self.accepted_names(field)
            .into_iter()
            .find_map(|name| non_blank(params.get(name).map(String::as_str)))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_table_order() {
        let scheme = ParameterScheme::default();
        assert_eq!(
            scheme.accepted_names(AttributionField::Campaign),
            vec!["at_campaign", "utm_campaign"]
        );
        assert_eq!(
            scheme.accepted_names(AttributionField::Medium),
            vec!["at_medium", "utm_medium"]
        );
        assert_eq!(scheme.accepted_names(AttributionField::Source), vec!["utm_source"]);
        assert_eq!(scheme.accepted_names(AttributionField::Content), vec!["utm_content"]);
    }

    #[test]
    fn test_utm_first_only_reorders_aliased_fields() {
        let scheme = ParameterScheme::new(SchemePrecedence::UtmFirst);
        assert_eq!(
            scheme.accepted_names(AttributionField::Campaign),
            vec!["utm_campaign", "at_campaign"]
        );
        assert_eq!(scheme.accepted_names(AttributionField::Source), vec!["utm_source"]);
    }

    #[test]
    fn test_lookup_precedence_within_one_source() {
        let p = params(&[("at_campaign", "legacy"), ("utm_campaign", "utm")]);
        assert_eq!(
            ParameterScheme::default().lookup(AttributionField::Campaign, &p),
            Some("legacy".into())
        );
        assert_eq!(
            ParameterScheme::new(SchemePrecedence::UtmFirst).lookup(AttributionField::Campaign, &p),
            Some("utm".into())
        );
    }

    #[test]
    fn test_lookup_skips_blank_values() {
        let p = params(&[("at_medium", "  "), ("utm_medium", "email")]);
        assert_eq!(
            ParameterScheme::default().lookup(AttributionField::Medium, &p),
            Some("email".into())
        );
        let blank = params(&[("utm_content", "")]);
        assert_eq!(ParameterScheme::default().lookup(AttributionField::Content, &blank), None);
    }

    #[test]
    fn test_source_has_no_legacy_alias() {
        let p = params(&[("at_source", "legacy")]);
        assert_eq!(ParameterScheme::default().lookup(AttributionField::Source, &p), None);
    }
}
