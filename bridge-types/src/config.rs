//! Bridge Configuration Records
//!
//! Configuration crosses the boundary as a JSON object (booleans in marker
//! form, see [`crate::marker`]). Decode markers first, then deserialize into
//! these records.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Default time (seconds) to show a loading state before falling back.
pub const DEFAULT_LOADING_BUDGET_SECS: f64 = 2.0;

/// Target backend environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

// Unrecognized environment strings fall back to production rather than
// failing the whole configuration.
impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_lowercase().as_str() {
            "sandbox" => Self::Sandbox,
            _ => Self::Production,
        })
    }
}

/// Forced light/dark appearance for paywall rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightDarkMode {
    Light,
    Dark,
    #[default]
    System,
}

impl LightDarkMode {
    /// Parse a case-insensitive mode tag; `None` for anything unrecognized
    /// so the caller can decide how loudly to fall back.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Loading behavior for a single trigger; `None` fields inherit the global
/// setting.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerLoadingConfig {
    pub use_loading_state: Option<bool>,
    pub loading_budget: Option<f64>,
}

/// Loading behavior while paywall assets are mid-download.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaywallLoadingConfig {
    pub use_loading_state: Option<bool>,
    /// Seconds to show the loading state before displaying fallback.
    pub loading_budget: Option<f64>,
    pub per_trigger_loading_config: Option<HashMap<String, TriggerLoadingConfig>>,
}

impl PaywallLoadingConfig {
    pub fn use_loading_state(&self) -> bool {
        self.use_loading_state.unwrap_or(true)
    }

    pub fn loading_budget(&self) -> f64 {
        self.loading_budget.unwrap_or(DEFAULT_LOADING_BUDGET_SECS)
    }
}

/// Fallback paywall content supplied at initialization. The two sources are
/// mutually exclusive; a file reference wins when both are present.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackSource {
    /// Path or URL string naming a bundled JSON file.
    File(String),
    /// Inline JSON payload.
    Inline(String),
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaywallConfig {
    pub api_key: String,
    pub custom_user_id: Option<String>,
    #[serde(rename = "customAPIEndpoint")]
    pub custom_api_endpoint: Option<String>,
    pub custom_user_traits: Option<Value>,
    pub revenue_cat_app_user_id: Option<String>,
    /// Select the store-backed default delegate instead of bridging
    /// purchases back to the host.
    pub use_default_delegate: bool,
    pub environment: Environment,
    pub fallback_bundle_url_string: Option<String>,
    pub fallback_bundle_string: Option<String>,
    pub paywall_loading_config: Option<PaywallLoadingConfig>,
}

impl PaywallConfig {
    /// The fallback content source, if any was configured.
    pub fn fallback_source(&self) -> Option<FallbackSource> {
        if let Some(url) = &self.fallback_bundle_url_string {
            Some(FallbackSource::File(url.clone()))
        } else {
            self.fallback_bundle_string
                .as_ref()
                .map(|inline| FallbackSource::Inline(inline.clone()))
        }
    }
}
