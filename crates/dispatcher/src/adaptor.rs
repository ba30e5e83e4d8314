//! Adaptor for rendering Piano events in the Piano Analytics collection
//! payload format, for transports that forward events as JSON.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use piano_core::PianoEvent;

/// Adaptor trait — transforms dispatched events into a platform-specific
/// JSON payload.
pub trait EventAdaptor: Send + Sync {
    /// Platform identifier (e.g. "piano").
    fn platform(&self) -> &str;

    /// Transform one event into the target platform's payload format.
    fn transform(&self, event: &PianoEvent) -> Result<serde_json::Value>;

    /// Transform a batch of events. Default implementation transforms one-by-one.
    fn transform_batch(&self, events: &[PianoEvent]) -> Result<Vec<serde_json::Value>> {
        events.iter().map(|e| self.transform(e)).collect()
    }

    /// Validate that the adaptor configuration is correct.
    fn validate_config(&self) -> Result<()>;
}

/// Configuration for the Piano JSON adaptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PianoAdaptorConfig {
    /// Piano site id the events are collected for.
    pub site_id: u32,
    /// Collection domain, e.g. "https://xxxxxxx.pa-cd.com".
    pub collection_domain: String,
}

/// Renders events as `{"name": …, "data": {…}}` and batches them in the
/// collection envelope.
pub struct PianoJsonAdaptor {
    config: PianoAdaptorConfig,
}

impl PianoJsonAdaptor {
    pub fn new(config: PianoAdaptorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PianoAdaptorConfig {
        &self.config
    }

    /// Full collection envelope for a batch of events.
    pub fn envelope(&self, events: &[PianoEvent]) -> Result<serde_json::Value> {
        let rendered = self.transform_batch(events)?;
        Ok(serde_json::json!({
            "site": self.config.site_id,
            "collect_domain": self.config.collection_domain,
            "events": rendered,
        }))
    }
}

impl EventAdaptor for PianoJsonAdaptor {
    fn platform(&self) -> &str {
        "piano"
    }

    fn transform(&self, event: &PianoEvent) -> Result<serde_json::Value> {
        let data = serde_json::to_value(&event.properties)?;
        debug!(
            event_name = %event.name,
            site_id = self.config.site_id,
            "piano event transformed"
        );
        Ok(serde_json::json!({
            "name": event.name,
            "data": data,
        }))
    }

    fn validate_config(&self) -> Result<()> {
        if self.config.site_id == 0 {
            return Err(anyhow!("piano site_id must be set"));
        }
        if self.config.collection_domain.is_empty() {
            return Err(anyhow!("piano collection_domain must not be empty"));
        }
        if !self.config.collection_domain.starts_with("https://") {
            return Err(anyhow!(
                "piano collection_domain must start with 'https://', got '{}'",
                self.config.collection_domain
            ));
        }
        Ok(())
    }
}
