//! Host-Facing Module Surface
//!
//! One [`PaywallModule`] exists per host module lifecycle; the runtime may
//! create several over a single process lifetime. Each instance carries its
//! own [`EventSink`], and every public entry point re-registers that sink as
//! the live delivery target (last write wins) so outbound events follow the
//! most recent instance.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, warn};

use bridge_core::DefaultDelegate;
use bridge_types::error::Result;
use bridge_types::event::PRESENTATION_EVENT;
use bridge_types::marker::decode_markers;
use bridge_types::{
    CanPresentResult, DownloadStatus, EngineInitConfig, EventSink, LightDarkMode, PaywallConfig,
    PaywallInfoResult, PresentationEventHandler, PurchaseDelegate,
};

use crate::context::BridgeContext;
use crate::fallback::stage_fallback_bundle;

pub struct PaywallModule {
    ctx: Arc<BridgeContext>,
    sink: Arc<dyn EventSink>,
}

impl PaywallModule {
    pub fn new(ctx: Arc<BridgeContext>, sink: Arc<dyn EventSink>) -> Self {
        Self { ctx, sink }
    }

    /// Lifecycle hook: this instance is now live. Registers it and drains
    /// any events buffered while no module was available.
    pub fn on_create(&self) {
        self.enter();
        self.ctx.registry().flush(&self.sink);
    }

    /// One-time SDK setup from a raw host configuration payload (booleans in
    /// marker form).
    ///
    /// Never propagates an error to the caller: configuration problems are
    /// logged and initialization continues in a degraded mode, which leaves
    /// the host application able to proceed.
    pub async fn initialize(&self, raw_config: Value) {
        self.enter();
        if let Err(err) = self.initialize_inner(raw_config).await {
            error!(error = %err, "Paywall SDK initialization failed; continuing degraded");
        }
    }

    async fn initialize_inner(&self, raw_config: Value) -> Result<()> {
        let config: PaywallConfig = serde_json::from_value(decode_markers(raw_config))?;

        let delegate = self.ctx.delegate();
        delegate.forwarder().set_home(self.sink.clone());

        let fallback_bundle_path = match config.fallback_source() {
            Some(source) => match stage_fallback_bundle(self.ctx.data_dir(), &source).await {
                Ok(path) => Some(path),
                Err(err) => {
                    // Missing fallback content degrades gracefully; the
                    // engine simply has nothing local to show.
                    warn!(error = %err, "Failed to stage fallback bundle");
                    None
                }
            },
            None => None,
        };

        let engine_delegate: Arc<dyn PurchaseDelegate> = if config.use_default_delegate {
            match self.ctx.store() {
                Some(store) => Arc::new(DefaultDelegate::new(
                    delegate.forwarder().clone(),
                    store.clone(),
                )),
                None => {
                    warn!("Default delegate requested but no store client wired; using bridged delegate");
                    delegate.clone()
                }
            }
        } else {
            delegate.clone()
        };

        self.ctx.engine().initialize(EngineInitConfig {
            api_key: config.api_key,
            delegate: engine_delegate,
            custom_user_id: config.custom_user_id,
            custom_api_endpoint: config.custom_api_endpoint,
            custom_user_traits: config.custom_user_traits.map(decode_markers),
            revenue_cat_app_user_id: config.revenue_cat_app_user_id,
            environment: config.environment,
            fallback_bundle_path,
            loading_config: config.paywall_loading_config,
        })?;

        debug!("Paywall SDK initialized");
        self.ctx.registry().flush(&self.sink);
        Ok(())
    }

    /// Request paywall display for a named trigger with per-presentation
    /// event forwarding.
    pub fn present_paywall(
        &self,
        trigger: &str,
        custom_traits: Option<Value>,
        dont_show_if_already_entitled: Option<bool>,
    ) -> Result<()> {
        self.enter();

        let registry = self.ctx.registry().clone();
        let backup = self.sink.clone();
        let on_event: PresentationEventHandler = Arc::new(move |event| {
            registry.safe_send(PRESENTATION_EVENT, event, Some(&backup));
        });

        self.ctx.engine().present_paywall(
            trigger,
            custom_traits.map(decode_markers),
            dont_show_if_already_entitled,
            on_event,
        )
    }

    pub fn hide_paywall(&self) -> Result<()> {
        self.enter();
        self.ctx.engine().hide_paywall()
    }

    pub fn hide_all_paywalls(&self) -> Result<()> {
        self.enter();
        self.ctx.engine().hide_all_paywalls()
    }

    pub fn get_download_status(&self) -> DownloadStatus {
        self.enter();
        self.ctx.engine().download_status()
    }

    /// Whether presenting for this trigger would show something right now,
    /// with a reason. Presentable when the trigger is fetched and ready, when
    /// a loading state can cover an in-progress download, or when staged
    /// fallback content exists.
    pub fn can_present_paywall(&self, trigger: &str) -> CanPresentResult {
        self.enter();
        let engine = self.ctx.engine();
        let loaded = engine.paywalls_loaded();

        if loaded && engine.has_trigger(trigger) {
            CanPresentResult::yes("ready")
        } else if engine.download_status() == DownloadStatus::InProgress
            && engine.loading_state_enabled_for(trigger)
        {
            CanPresentResult::yes("loading")
        } else if engine.fallback_available(trigger) {
            CanPresentResult::yes("fallback_ready")
        } else if !loaded {
            CanPresentResult::no(format!(
                "download status - {}",
                engine.download_status().as_str()
            ))
        } else {
            CanPresentResult::no("trigger_not_found")
        }
    }

    pub fn get_paywall_info(&self, trigger: &str) -> PaywallInfoResult {
        self.enter();
        self.ctx
            .engine()
            .paywall_info(trigger)
            .unwrap_or_else(PaywallInfoResult::not_found)
    }

    /// Host answer to a pending purchase request.
    pub fn resume_purchase(&self, status_tag: &str, error_msg: Option<&str>) {
        self.enter();
        self.ctx.delegate().resume_purchase(status_tag, error_msg);
    }

    /// Host answer to a pending restore request.
    pub fn resume_restore(&self, success: bool) {
        self.enter();
        self.ctx.delegate().resume_restore(success);
    }

    pub async fn has_entitlement_for_paywall(&self, trigger: &str) -> Result<bool> {
        self.enter();
        self.ctx.engine().has_entitlement_for_paywall(trigger).await
    }

    pub async fn has_any_active_subscription(&self) -> Result<bool> {
        self.enter();
        self.ctx.engine().has_any_active_subscription().await
    }

    pub async fn has_any_entitlement(&self) -> Result<bool> {
        self.enter();
        self.ctx.engine().has_any_entitlement().await
    }

    pub fn set_revenue_cat_app_user_id(&self, app_user_id: &str) {
        self.enter();
        self.ctx.engine().set_revenue_cat_app_user_id(app_user_id);
    }

    pub fn set_custom_user_id(&self, user_id: &str) {
        self.enter();
        self.ctx.engine().set_custom_user_id(user_id);
    }

    pub fn handle_deep_link(&self, url: &str) -> bool {
        self.enter();
        self.ctx.engine().handle_deep_link(url)
    }

    /// Experiment allocation info for a trigger; a missing allocation is
    /// reported inside the payload rather than as an error.
    pub fn experiment_info_for_trigger(&self, trigger: &str) -> Value {
        self.enter();
        match self.ctx.engine().experiment_info(trigger) {
            Some(info) => info,
            None => json!({
                "getExperimentInfoErrorMsg":
                    format!("No experiment info found for trigger: {trigger}"),
            }),
        }
    }

    /// Notify the engine that a fallback view opened or closed on the host
    /// side.
    pub fn fallback_open_or_close(
        &self,
        trigger: Option<&str>,
        is_open: bool,
        view_type: Option<&str>,
    ) {
        self.enter();
        self.ctx
            .engine()
            .on_fallback_open_close(trigger, is_open, view_type);
    }

    /// Tear the SDK down to its pre-initialization state.
    pub fn reset(&self) {
        self.enter();
        self.ctx.engine().reset();
    }

    pub fn disable_restore_failed_dialog(&self) {
        self.enter();
        self.ctx.engine().disable_restore_failed_dialog();
    }

    pub fn set_custom_restore_failed_strings(
        &self,
        title: Option<&str>,
        message: Option<&str>,
        close_button_text: Option<&str>,
    ) {
        self.enter();
        self.ctx
            .engine()
            .set_custom_restore_failed_strings(title, message, close_button_text);
    }

    /// Force light/dark appearance; an unrecognized mode tag is logged and
    /// treated as system.
    pub fn set_light_dark_mode_override(&self, mode: &str) {
        self.enter();
        let mode = LightDarkMode::from_tag(mode).unwrap_or_else(|| {
            warn!(mode, "Invalid light/dark mode; defaulting to system");
            LightDarkMode::default()
        });
        self.ctx.engine().set_light_dark_mode_override(mode);
    }

    fn enter(&self) {
        self.ctx.registry().register(self.sink.clone());
    }
}
