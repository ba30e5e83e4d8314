//! Piano dispatcher — receives Batch events, resolves attribution once per
//! event and hands the resulting Piano events to the transport sink.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use piano_attribution::AttributionResolver;
use piano_core::event_bus::{noop_sink, EventSink};
use piano_core::{
    DispatchError, DispatchResult, DispatcherConfig, EventPayload, PianoEvent, RawEventType,
    SchemePrecedence,
};

use crate::builders::{custom_event, on_site_ad_event};
use crate::classifier::classify;

/// Name reported to the Batch SDK for its own analytics.
pub const DISPATCHER_NAME: &str = "piano";
pub const DISPATCHER_VERSION: u32 = 2;

/// Dispatches Batch events as Piano on-site ad and custom events.
///
/// Each instance owns its toggles; several differently configured
/// dispatchers can coexist. Toggles may be flipped from any thread while
/// other threads dispatch: every dispatch works on one config snapshot.
pub struct PianoDispatcher {
    config: RwLock<DispatcherConfig>,
    sink: Arc<dyn EventSink>,
}

impl PianoDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config: RwLock::new(config),
            sink: noop_sink(),
        }
    }

    /// Attach the transport that receives built events.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn name(&self) -> &'static str {
        DISPATCHER_NAME
    }

    pub fn version(&self) -> u32 {
        DISPATCHER_VERSION
    }

    /// Snapshot of the current toggles.
    pub fn config(&self) -> DispatcherConfig {
        *self.config.read()
    }

    /// Whether Batch events are also sent as Piano custom events.
    ///
    /// Custom events and their properties must be declared in the Piano Data
    /// Model.
    pub fn enable_custom_events(&self, enabled: bool) {
        self.config.write().custom_events_enabled = enabled;
        info!(enabled, "piano custom events toggled");
    }

    /// Whether impressions and clicks are sent as on-site ad events.
    pub fn enable_on_site_ads_events(&self, enabled: bool) {
        self.config.write().on_site_ads_enabled = enabled;
        info!(enabled, "piano on-site ads events toggled");
    }

    /// Whether UTM/AT tags in deep links and custom payloads are used for
    /// attribution.
    pub fn enable_utm_tracking(&self, enabled: bool) {
        self.config.write().utm_tracking_enabled = enabled;
        info!(enabled, "piano utm tracking toggled");
    }

    pub fn set_scheme_precedence(&self, precedence: SchemePrecedence) {
        self.config.write().scheme_precedence = precedence;
        info!(?precedence, "piano scheme precedence changed");
    }

    /// Build and send the events for one Batch event. Returns what was sent:
    /// the on-site ad event first (if any), then the custom event (if any).
    pub fn dispatch(&self, raw_type: RawEventType, payload: &EventPayload) -> Vec<PianoEvent> {
        let config = self.config();
        let facets = classify(raw_type);
        let attribution = AttributionResolver::new(&config).resolve(payload, &facets);

        let mut sent = Vec::with_capacity(2);

        if config.on_site_ads_enabled {
            if let Some(event) = on_site_ad_event(&facets, &attribution) {
                metrics::counter!("piano.events.on_site_ad").increment(1);
                sent.push(event);
            }
        }

        if config.custom_events_enabled {
            metrics::counter!("piano.events.custom").increment(1);
            sent.push(custom_event(&facets, payload, &attribution));
        }

        for event in &sent {
            debug!(
                event_type = %raw_type,
                name = %event.name,
                campaign = %attribution.campaign,
                "piano event dispatched"
            );
            self.sink.send(event.clone());
        }

        sent
    }

    /// Dispatch using the host SDK's raw type tag.
    pub fn dispatch_raw(&self, tag: &str, payload: &EventPayload) -> DispatchResult<Vec<PianoEvent>> {
        let raw_type: RawEventType = tag.parse().map_err(|e: DispatchError| {
            metrics::counter!("piano.events.unknown_type").increment(1);
            warn!(tag, "unknown batch event type");
            e
        })?;
        Ok(self.dispatch(raw_type, payload))
    }
}

impl Default for PianoDispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piano_core::event_bus::capture_sink;

    fn payload() -> EventPayload {
        EventPayload::new().with_tracking_id("campaign_label")
    }

    #[test]
    fn test_identity() {
        let dispatcher = PianoDispatcher::default();
        assert_eq!(dispatcher.name(), "piano");
        assert_eq!(dispatcher.version(), 2);
    }

    #[test]
    fn test_dispatch_impression_sends_both() {
        let sink = capture_sink();
        let dispatcher = PianoDispatcher::default().with_sink(sink.clone());

        let sent = dispatcher.dispatch(RawEventType::NotificationDisplay, &payload());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].name, "publisher.impression");
        assert_eq!(sent[1].name, "batch_notification_display");
        assert_eq!(sink.events(), sent);
    }

    #[test]
    fn test_dispatch_neutral_type_sends_custom_only() {
        let sink = capture_sink();
        let dispatcher = PianoDispatcher::default().with_sink(sink.clone());

        dispatcher.dispatch(RawEventType::MessagingClose, &payload());
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.count_named("batch_in_app_close"), 1);
    }

    #[test]
    fn test_toggles_affect_subsequent_dispatches() {
        let sink = capture_sink();
        let dispatcher = PianoDispatcher::default().with_sink(sink.clone());

        dispatcher.enable_on_site_ads_events(false);
        dispatcher.dispatch(RawEventType::NotificationOpen, &payload());
        assert_eq!(sink.count_named("publisher.click"), 0);
        assert_eq!(sink.count_named("batch_notification_open"), 1);

        dispatcher.enable_custom_events(false);
        assert!(dispatcher.dispatch(RawEventType::NotificationOpen, &payload()).is_empty());

        dispatcher.enable_on_site_ads_events(true);
        let sent = dispatcher.dispatch(RawEventType::NotificationOpen, &payload());
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "publisher.click");
    }

    #[test]
    fn test_utm_toggle_and_precedence() {
        let dispatcher = PianoDispatcher::default();
        let payload = EventPayload::new()
            .with_tracking_id("T")
            .with_custom_parameter("at_campaign", "legacy")
            .with_custom_parameter("utm_campaign", "utm");

        let campaign = |events: &[PianoEvent]| {
            events[0]
                .str_property("onsitead_campaign")
                .map(str::to_string)
        };

        assert_eq!(
            campaign(&dispatcher.dispatch(RawEventType::NotificationDisplay, &payload)),
            Some("legacy".to_string())
        );
        dispatcher.set_scheme_precedence(SchemePrecedence::UtmFirst);
        assert_eq!(
            campaign(&dispatcher.dispatch(RawEventType::NotificationDisplay, &payload)),
            Some("utm".to_string())
        );
        dispatcher.enable_utm_tracking(false);
        assert_eq!(
            campaign(&dispatcher.dispatch(RawEventType::NotificationDisplay, &payload)),
            Some("T".to_string())
        );
        assert!(!dispatcher.config().utm_tracking_enabled);
    }

    #[test]
    fn test_dispatch_raw() {
        let dispatcher = PianoDispatcher::default();
        let sent = dispatcher.dispatch_raw("messaging_click", &payload()).unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].name, "publisher.click");

        let err = dispatcher.dispatch_raw("content_card_show", &payload()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownEventType(_)));
    }

    #[test]
    fn test_independent_instances() {
        let a = PianoDispatcher::default();
        let b = PianoDispatcher::default();
        a.enable_custom_events(false);
        assert!(!a.config().custom_events_enabled);
        assert!(b.config().custom_events_enabled);
    }

    #[test]
    fn test_concurrent_dispatch_and_toggle() {
        let sink = capture_sink();
        let dispatcher = Arc::new(PianoDispatcher::default().with_sink(sink.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        if i == 0 {
                            dispatcher.enable_utm_tracking(false);
                            dispatcher.enable_utm_tracking(true);
                        } else {
                            let sent = dispatcher
                                .dispatch(RawEventType::NotificationDisplay, &payload());
                            assert_eq!(sent.len(), 2);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.count(), 3 * 50 * 2);
    }
}
