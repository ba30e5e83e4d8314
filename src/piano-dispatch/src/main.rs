//! piano-dispatch — run one Batch event through the Piano dispatcher and
//! print the produced Piano events as JSON lines.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use piano_core::event_bus::EventSink;
use piano_core::{DispatcherConfig, EventPayload, PianoEvent, SchemePrecedence};
use piano_dispatcher::{EventAdaptor, PianoAdaptorConfig, PianoDispatcher, PianoJsonAdaptor};

#[derive(Parser, Debug)]
#[command(name = "piano-dispatch")]
#[command(about = "Translate a Batch SDK event into Piano Analytics events")]
#[command(version)]
struct Cli {
    /// Batch event type, e.g. notification_display, messaging_click
    #[arg(short = 't', long)]
    event_type: String,

    /// Payload JSON file ("-" or omitted reads stdin)
    #[arg(short, long)]
    payload: Option<PathBuf>,

    /// TOML config file (environment PIANO_DISPATCHER__* still applies)
    #[arg(short, long, env = "PIANO_DISPATCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Do not send on-site ad events
    #[arg(long, default_value_t = false)]
    no_on_site_ads: bool,

    /// Do not send custom events
    #[arg(long, default_value_t = false)]
    no_custom_events: bool,

    /// Ignore UTM/AT tags in deep links and custom parameters
    #[arg(long, default_value_t = false)]
    no_utm_tracking: bool,

    /// Prefer utm_* over at_* when both are in the same source
    #[arg(long, default_value_t = false)]
    utm_first: bool,

    /// Wrap output in a Piano collection envelope for this site id
    #[arg(long, requires = "collect_domain")]
    site_id: Option<u32>,

    /// Piano collection domain used with --site-id
    #[arg(long)]
    collect_domain: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

/// Collects dispatched events so they can be rendered after dispatch.
#[derive(Default)]
struct BufferSink {
    events: Mutex<Vec<PianoEvent>>,
}

impl EventSink for BufferSink {
    fn send(&self, event: PianoEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "piano_dispatch=info,piano_dispatcher=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DispatcherConfig> {
    let mut config = match &cli.config {
        Some(path) => DispatcherConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DispatcherConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            DispatcherConfig::default()
        }),
    };

    // Apply CLI overrides
    if cli.no_on_site_ads {
        config.on_site_ads_enabled = false;
    }
    if cli.no_custom_events {
        config.custom_events_enabled = false;
    }
    if cli.no_utm_tracking {
        config.utm_tracking_enabled = false;
    }
    if cli.utm_first {
        config.scheme_precedence = SchemePrecedence::UtmFirst;
    }
    Ok(config)
}

fn read_payload(path: Option<&PathBuf>) -> anyhow::Result<EventPayload> {
    let raw = match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read payload {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };
    EventPayload::from_json(&raw).context("payload is not a valid event payload JSON")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load_config(&cli)?;
    let payload = read_payload(cli.payload.as_ref())?;

    info!(
        event_type = %cli.event_type,
        on_site_ads = config.on_site_ads_enabled,
        custom_events = config.custom_events_enabled,
        utm_tracking = config.utm_tracking_enabled,
        "dispatching batch event"
    );

    let sink = Arc::new(BufferSink::default());
    let dispatcher = PianoDispatcher::new(config).with_sink(sink.clone());
    dispatcher.dispatch_raw(&cli.event_type, &payload)?;

    let events = sink
        .events
        .lock()
        .map_err(|_| anyhow::anyhow!("event buffer poisoned"))?
        .clone();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.site_id {
        Some(site_id) => {
            let adaptor = PianoJsonAdaptor::new(PianoAdaptorConfig {
                site_id,
                collection_domain: cli.collect_domain.clone().unwrap_or_default(),
            });
            adaptor.validate_config()?;
            writeln!(out, "{}", adaptor.envelope(&events)?)?;
        }
        None => {
            for event in &events {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
        }
    }

    info!(count = events.len(), "piano events written");
    Ok(())
}
