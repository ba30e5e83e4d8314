use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{DispatchError, DispatchResult};

/// Event types raised by the Batch SDK and handed to the dispatcher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RawEventType {
    NotificationDisplay,
    /// Notification clicked by the user.
    NotificationOpen,
    NotificationDismiss,
    MessagingShow,
    MessagingClose,
    MessagingAutoClose,
    MessagingCloseError,
    MessagingClick,
    MessagingWebviewClick,
}

impl RawEventType {
    pub const ALL: [RawEventType; 9] = [
        RawEventType::NotificationDisplay,
        RawEventType::NotificationOpen,
        RawEventType::NotificationDismiss,
        RawEventType::MessagingShow,
        RawEventType::MessagingClose,
        RawEventType::MessagingAutoClose,
        RawEventType::MessagingCloseError,
        RawEventType::MessagingClick,
        RawEventType::MessagingWebviewClick,
    ];

    /// Host SDK tag for this type, e.g. "notification_display".
    pub fn as_str(&self) -> &'static str {
        match self {
            RawEventType::NotificationDisplay => "notification_display",
            RawEventType::NotificationOpen => "notification_open",
            RawEventType::NotificationDismiss => "notification_dismiss",
            RawEventType::MessagingShow => "messaging_show",
            RawEventType::MessagingClose => "messaging_close",
            RawEventType::MessagingAutoClose => "messaging_auto_close",
            RawEventType::MessagingCloseError => "messaging_close_error",
            RawEventType::MessagingClick => "messaging_click",
            RawEventType::MessagingWebviewClick => "messaging_webview_click",
        }
    }
}

impl fmt::Display for RawEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawEventType {
    type Err = DispatchError;

    /// Tags are matched case-insensitively; anything else is rejected rather
    /// than guessed.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().to_ascii_lowercase();
        RawEventType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DispatchError::UnknownEventType(tag.to_string()))
    }
}

/// Payload attached by the host SDK to every event. Read-only for the
/// duration of a dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPayload {
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub deep_link: Option<String>,
    /// Flat key/value attachment, e.g. push notification extras.
    #[serde(default)]
    pub custom_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub webview_analytics_id: Option<String>,
}

impl EventPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a payload from JSON. Blank input is an empty payload.
    pub fn from_json(raw: &str) -> DispatchResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn with_deep_link(mut self, deep_link: impl Into<String>) -> Self {
        self.deep_link = Some(deep_link.into());
        self
    }

    pub fn with_custom_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.custom_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_webview_analytics_id(mut self, id: impl Into<String>) -> Self {
        self.webview_analytics_id = Some(id.into());
        self
    }

    /// Tracking id if present and non-blank.
    pub fn tracking_id(&self) -> Option<&str> {
        non_blank(self.tracking_id.as_deref())
    }

    pub fn webview_analytics_id(&self) -> Option<&str> {
        non_blank(self.webview_analytics_id.as_deref())
    }
}

/// Semantic facets derived from a [`RawEventType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFacets {
    pub is_messaging_surface: bool,
    pub is_impression: bool,
    pub is_click: bool,
    pub custom_event_name: &'static str,
}

impl EventFacets {
    /// Surface default medium, also used as the on-site ad format.
    pub fn default_medium(&self) -> &'static str {
        if self.is_messaging_surface {
            FORMAT_IN_APP
        } else {
            FORMAT_PUSH
        }
    }
}

pub const FORMAT_IN_APP: &str = "in-app";
pub const FORMAT_PUSH: &str = "push";

/// Resolved attribution values for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub campaign: String,
    pub source: String,
    pub medium: String,
    /// Only set when explicitly resolved, never defaulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Property value accepted by the analytics backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    String(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::String(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Event handed to the analytics transport: a name plus named properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PianoEvent {
    pub name: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl PianoEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }
}

/// `Some(value)` unless the value is absent or whitespace-only.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_event_type_parsing() {
        assert_eq!(
            "notification_display".parse::<RawEventType>().unwrap(),
            RawEventType::NotificationDisplay
        );
        assert_eq!(
            " Messaging_Click ".parse::<RawEventType>().unwrap(),
            RawEventType::MessagingClick
        );
        for t in RawEventType::ALL {
            assert_eq!(t.as_str().parse::<RawEventType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let err = "content_card_click".parse::<RawEventType>().unwrap_err();
        assert!(matches!(err, DispatchError::UnknownEventType(ref t) if t == "content_card_click"));
    }

    #[test]
    fn test_serde_tags_match_as_str() {
        for t in RawEventType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_payload_blank_values() {
        let payload = EventPayload::new()
            .with_tracking_id("   ")
            .with_webview_analytics_id("wv-1");
        assert_eq!(payload.tracking_id(), None);
        assert_eq!(payload.webview_analytics_id(), Some("wv-1"));
    }

    #[test]
    fn test_payload_deserialize_partial() {
        let payload: EventPayload =
            serde_json::from_str(r#"{"tracking_id":"T","custom_parameters":{"utm_source":"x"}}"#)
                .unwrap();
        assert_eq!(payload.tracking_id(), Some("T"));
        assert!(payload.deep_link.is_none());
        assert_eq!(
            payload.custom_parameters.unwrap().get("utm_source").map(String::as_str),
            Some("x")
        );
    }

    #[test]
    fn test_payload_from_json() {
        assert_eq!(EventPayload::from_json("  \n").unwrap(), EventPayload::default());
        let payload = EventPayload::from_json(r#"{"deep_link":"https://t.co?utm_source=x"}"#).unwrap();
        assert_eq!(payload.deep_link.as_deref(), Some("https://t.co?utm_source=x"));
        assert!(matches!(
            EventPayload::from_json("{not json"),
            Err(DispatchError::Serialization(_))
        ));
    }

    #[test]
    fn test_event_serialization() {
        let event = PianoEvent::new("publisher.click")
            .with_property("src_force", true)
            .with_property("src_source", "Batch");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "publisher.click");
        assert_eq!(json["properties"]["src_force"], true);
        assert_eq!(json["properties"]["src_source"], "Batch");
        assert_eq!(event.str_property("src_source"), Some("Batch"));
        assert_eq!(event.property("src_force").and_then(PropertyValue::as_bool), Some(true));
    }
}
