use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::autotag::AutoTagOptions;

/// Runtime settings. Every field has a default, so an empty source is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub export: ExportSettings,
    pub auto_tag: AutoTagSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub plugin_name: String,
    pub version: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            plugin_name: "Semantic Tagging".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTagSettings {
    pub include_descendants: bool,
}

impl From<&AutoTagSettings> for AutoTagOptions {
    fn from(settings: &AutoTagSettings) -> Self {
        Self {
            include_descendants: settings.include_descendants,
        }
    }
}

impl Settings {
    /// Load settings from an optional file (format picked by extension),
    /// then `SEMTAG__*` environment variables
    /// (e.g. `SEMTAG__AUTO_TAG__INCLUDE_DESCENDANTS=true`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(Environment::with_prefix("SEMTAG").separator("__"))
            .build()?
            .try_deserialize()
    }
}
