//! Event classifier — static mapping from Batch event types to the facets the
//! builders need (surface, impression/click, custom event name).

use piano_core::{DispatchResult, EventFacets, RawEventType};

const fn facets(
    is_messaging_surface: bool,
    is_impression: bool,
    is_click: bool,
    custom_event_name: &'static str,
) -> EventFacets {
    EventFacets {
        is_messaging_surface,
        is_impression,
        is_click,
        custom_event_name,
    }
}

/// Facets for a known event type.
pub fn classify(raw_type: RawEventType) -> EventFacets {
    match raw_type {
        RawEventType::NotificationDisplay => facets(false, true, false, "batch_notification_display"),
        RawEventType::NotificationOpen => facets(false, false, true, "batch_notification_open"),
        RawEventType::NotificationDismiss => facets(false, false, false, "batch_notification_dismiss"),
        RawEventType::MessagingShow => facets(true, false, false, "batch_in_app_show"),
        RawEventType::MessagingClose => facets(true, false, false, "batch_in_app_close"),
        RawEventType::MessagingAutoClose => facets(true, false, false, "batch_in_app_auto_close"),
        RawEventType::MessagingCloseError => facets(true, false, false, "batch_in_app_close_error"),
        RawEventType::MessagingClick => facets(true, false, true, "batch_in_app_click"),
        RawEventType::MessagingWebviewClick => facets(true, false, true, "batch_in_app_webview_click"),
    }
}

/// Classify a raw host tag. Unknown tags are rejected with
/// [`piano_core::DispatchError::UnknownEventType`].
pub fn classify_tag(tag: &str) -> DispatchResult<EventFacets> {
    Ok(classify(tag.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use piano_core::DispatchError;

    #[test]
    fn test_core_types() {
        let show = classify(RawEventType::MessagingShow);
        assert!(show.is_messaging_surface);
        assert!(!show.is_impression);
        assert!(!show.is_click);
        assert_eq!(show.custom_event_name, "batch_in_app_show");
        assert_eq!(show.default_medium(), "in-app");

        let click = classify(RawEventType::MessagingClick);
        assert!(click.is_messaging_surface && click.is_click && !click.is_impression);
        assert_eq!(click.custom_event_name, "batch_in_app_click");

        let display = classify(RawEventType::NotificationDisplay);
        assert!(!display.is_messaging_surface && display.is_impression && !display.is_click);
        assert_eq!(display.custom_event_name, "batch_notification_display");
        assert_eq!(display.default_medium(), "push");

        let open = classify(RawEventType::NotificationOpen);
        assert!(!open.is_messaging_surface && open.is_click && !open.is_impression);
        assert_eq!(open.custom_event_name, "batch_notification_open");
    }

    #[test]
    fn test_never_both_impression_and_click() {
        for t in RawEventType::ALL {
            let f = classify(t);
            assert!(!(f.is_impression && f.is_click), "{t} is both");
            assert!(f.custom_event_name.starts_with("batch_"));
        }
    }

    #[test]
    fn test_surface_follows_type_family() {
        for t in RawEventType::ALL {
            let messaging = t.as_str().starts_with("messaging_");
            assert_eq!(classify(t).is_messaging_surface, messaging, "{t}");
        }
    }

    #[test]
    fn test_classify_tag() {
        let facets = classify_tag("notification_open").unwrap();
        assert_eq!(facets.custom_event_name, "batch_notification_open");

        let err = classify_tag("batch_unknown").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownEventType(_)));
    }
}
