//! Event builders — compose the Piano custom event and the on-site ad event
//! from resolved attribution and classifier facets.

use piano_attribution::{AttributionResolver, BATCH_SOURCE};
use piano_core::{AttributionResult, DispatcherConfig, EventFacets, EventPayload, PianoEvent, RawEventType};

use crate::classifier::classify;

// Piano custom event properties. Must be declared in the Piano Data Model.
pub const CAMPAIGN: &str = "src_campaign";
pub const SOURCE: &str = "src_source";
pub const SOURCE_FORCE: &str = "src_force";
pub const MEDIUM: &str = "src_medium";
pub const CONTENT: &str = "src_content";
pub const BATCH_TRACKING_ID: &str = "batch_tracking_id";
pub const BATCH_WEBVIEW_ANALYTICS_ID: &str = "batch_webview_analytics_id";

// On-site ads
pub const EVENT_IMPRESSION: &str = "publisher.impression";
pub const EVENT_CLICK: &str = "publisher.click";
pub const ON_SITE_TYPE: &str = "onsitead_type";
pub const ON_SITE_TYPE_PUBLISHER: &str = "Publisher";
pub const ON_SITE_ADVERTISER: &str = "onsitead_advertiser";
pub const ON_SITE_CAMPAIGN: &str = "onsitead_campaign";
pub const ON_SITE_FORMAT: &str = "onsitead_format";

/// Build the custom event for `raw_type`. Whether it gets sent is decided by
/// the dispatcher (`custom_events_enabled`).
pub fn build_custom_event(
    raw_type: RawEventType,
    payload: &EventPayload,
    config: &DispatcherConfig,
) -> PianoEvent {
    let facets = classify(raw_type);
    let attribution = AttributionResolver::new(config).resolve(payload, &facets);
    custom_event(&facets, payload, &attribution)
}

/// Build the on-site ad event, if on-site ads are enabled and the type is an
/// impression or a click.
pub fn build_on_site_ad_event(
    raw_type: RawEventType,
    payload: &EventPayload,
    config: &DispatcherConfig,
) -> Option<PianoEvent> {
    if !config.on_site_ads_enabled {
        return None;
    }
    let facets = classify(raw_type);
    if !(facets.is_impression || facets.is_click) {
        return None;
    }
    let attribution = AttributionResolver::new(config).resolve(payload, &facets);
    on_site_ad_event(&facets, &attribution)
}

pub(crate) fn custom_event(
    facets: &EventFacets,
    payload: &EventPayload,
    attribution: &AttributionResult,
) -> PianoEvent {
    let mut event = PianoEvent::new(facets.custom_event_name)
        .with_property(SOURCE, attribution.source.as_str())
        .with_property(CAMPAIGN, attribution.campaign.as_str())
        .with_property(MEDIUM, attribution.medium.as_str())
        .with_property(SOURCE_FORCE, true);

    if let Some(content) = attribution.content.as_deref() {
        event.insert(CONTENT, content);
    }
    if let Some(tracking_id) = payload.tracking_id() {
        event.insert(BATCH_TRACKING_ID, tracking_id);
    }
    if facets.is_messaging_surface {
        if let Some(webview_id) = payload.webview_analytics_id() {
            event.insert(BATCH_WEBVIEW_ANALYTICS_ID, webview_id);
        }
    }
    event
}

/// The format is the surface default, never the resolved medium.
pub(crate) fn on_site_ad_event(
    facets: &EventFacets,
    attribution: &AttributionResult,
) -> Option<PianoEvent> {
    let name = if facets.is_impression {
        EVENT_IMPRESSION
    } else if facets.is_click {
        EVENT_CLICK
    } else {
        return None;
    };

    Some(
        PianoEvent::new(name)
            .with_property(ON_SITE_TYPE, ON_SITE_TYPE_PUBLISHER)
            .with_property(ON_SITE_ADVERTISER, BATCH_SOURCE)
            .with_property(ON_SITE_CAMPAIGN, attribution.campaign.as_str())
            .with_property(ON_SITE_FORMAT, facets.default_medium()),
    )
}
