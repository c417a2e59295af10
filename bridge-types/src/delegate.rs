//! Bridge Contract Traits
//!
//! The seams between the bridge and its collaborators. The paywall engine
//! and the store billing client are closed external SDKs; the traits here
//! describe only the interfaces this bridge consumes or implements.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::{Environment, LightDarkMode, PaywallLoadingConfig},
    error::Result,
    event::ProductIdentity,
    status::{DownloadStatus, PaywallInfoResult, TransactionStatus},
};

/// A live host module instance able to receive outbound events.
///
/// Delivery can fail even for a registered sink (the host runtime may reject
/// events for a module it considers mid-teardown); callers treat that as an
/// ordinary failure mode.
pub trait EventSink: Send + Sync {
    fn send_event(&self, name: &str, payload: Value) -> Result<()>;
}

/// The purchase delegate the paywall engine drives.
///
/// `make_purchase` and `restore_purchases` never error: unresolvable states
/// map to `Failed` / `false`.
#[async_trait]
pub trait PurchaseDelegate: Send + Sync {
    async fn make_purchase(&self, product: ProductIdentity) -> TransactionStatus;

    async fn restore_purchases(&self) -> bool;

    /// Paywall lifecycle event emitted by the engine.
    fn on_paywall_event(&self, event: Map<String, Value>);
}

/// Handler receiving per-presentation events (open, close, dismissed,
/// purchase succeeded, open failed, custom action).
pub type PresentationEventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Engine-side initialization parameters, assembled from [`crate::config::PaywallConfig`]
/// after marker decoding and fallback staging.
pub struct EngineInitConfig {
    pub api_key: String,
    pub delegate: Arc<dyn PurchaseDelegate>,
    pub custom_user_id: Option<String>,
    pub custom_api_endpoint: Option<String>,
    pub custom_user_traits: Option<Value>,
    pub revenue_cat_app_user_id: Option<String>,
    pub environment: Environment,
    /// On-disk fallback bundle staged by the bridge, if any.
    pub fallback_bundle_path: Option<PathBuf>,
    pub loading_config: Option<PaywallLoadingConfig>,
}

/// The native paywall engine (download, caching, rendering of paywall UI).
///
/// An external collaborator reached through a fixed API; everything behind it
/// is out of scope for this bridge.
#[async_trait]
pub trait PaywallEngine: Send + Sync {
    fn initialize(&self, config: EngineInitConfig) -> Result<()>;

    fn present_paywall(
        &self,
        trigger: &str,
        custom_traits: Option<Value>,
        dont_show_if_already_entitled: Option<bool>,
        on_event: PresentationEventHandler,
    ) -> Result<()>;

    fn hide_paywall(&self) -> Result<()>;

    fn hide_all_paywalls(&self) -> Result<()>;

    fn download_status(&self) -> DownloadStatus;

    /// Whether the fetched paywall configuration has finished downloading.
    fn paywalls_loaded(&self) -> bool;

    /// Whether the named trigger exists in the fetched configuration.
    fn has_trigger(&self, trigger: &str) -> bool;

    /// Whether a loading state may be shown for this trigger mid-download.
    fn loading_state_enabled_for(&self, trigger: &str) -> bool;

    /// Whether staged fallback content exists for this trigger.
    fn fallback_available(&self, trigger: &str) -> bool;

    fn paywall_info(&self, trigger: &str) -> Option<PaywallInfoResult>;

    async fn has_entitlement_for_paywall(&self, trigger: &str) -> Result<bool>;

    async fn has_any_active_subscription(&self) -> Result<bool>;

    async fn has_any_entitlement(&self) -> Result<bool>;

    fn set_revenue_cat_app_user_id(&self, app_user_id: &str);

    fn set_custom_user_id(&self, user_id: &str);

    fn handle_deep_link(&self, url: &str) -> bool;

    /// Experiment allocation info for a trigger, if one is active.
    fn experiment_info(&self, trigger: &str) -> Option<Value>;

    /// Notification that a fallback view opened or closed on the host side.
    fn on_fallback_open_close(&self, trigger: Option<&str>, is_open: bool, view_type: Option<&str>);

    /// Tear the engine down to its pre-initialization state.
    fn reset(&self);

    fn disable_restore_failed_dialog(&self);

    /// Override the restore-failed dialog copy; `None` keeps the stock text
    /// for that field.
    fn set_custom_restore_failed_strings(
        &self,
        title: Option<&str>,
        message: Option<&str>,
        close_button_text: Option<&str>,
    );

    fn set_light_dark_mode_override(&self, mode: LightDarkMode);
}

/// The store billing client backing the default purchase delegate.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn purchase(&self, product: ProductIdentity) -> Result<TransactionStatus>;

    /// Returns whether at least one entitlement was restored.
    async fn restore(&self) -> Result<bool>;
}
