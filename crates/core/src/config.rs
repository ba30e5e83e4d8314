use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DispatchResult;

/// Which naming scheme wins when both an `at_*` and a `utm_*` parameter for
/// the same field appear inside one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemePrecedence {
    /// `at_campaign` before `utm_campaign`, `at_medium` before `utm_medium`.
    #[default]
    LegacyFirst,
    UtmFirst,
}

/// Dispatcher feature toggles. Loaded from environment variables with the
/// prefix `PIANO_DISPATCHER__` and, optionally, a TOML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_enabled")]
    pub on_site_ads_enabled: bool,
    #[serde(default = "default_enabled")]
    pub custom_events_enabled: bool,
    /// When off, deep links and custom parameters are ignored entirely.
    #[serde(default = "default_enabled")]
    pub utm_tracking_enabled: bool,
    #[serde(default)]
    pub scheme_precedence: SchemePrecedence,
}

fn default_enabled() -> bool {
    true
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            on_site_ads_enabled: default_enabled(),
            custom_events_enabled: default_enabled(),
            utm_tracking_enabled: default_enabled(),
            scheme_precedence: SchemePrecedence::default(),
        }
    }
}

impl DispatcherConfig {
    /// Load configuration from the environment only.
    pub fn load() -> DispatchResult<Self> {
        Ok(Self::builder(None).build()?.try_deserialize()?)
    }

    /// Load configuration from a TOML file, with environment overrides on top.
    pub fn load_from(path: impl AsRef<Path>) -> DispatchResult<Self> {
        Ok(Self::builder(Some(path.as_ref())).build()?.try_deserialize()?)
    }

    fn builder(
        path: Option<&Path>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder.add_source(
            config::Environment::with_prefix("PIANO_DISPATCHER")
                .separator("__")
                .try_parsing(true),
        )
    }
}
