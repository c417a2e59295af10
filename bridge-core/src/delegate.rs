//! Purchase Delegate Adapters
//!
//! Two implementations of the engine's purchase delegate, selected once at
//! initialization:
//!
//! - [`BridgedDelegate`] forwards purchase/restore requests to the host and
//!   suspends until the host answers through the resume entry points.
//! - [`DefaultDelegate`] fulfils them natively through a [`StoreClient`].
//!
//! Both share the [`EventForwarder`] capability for relaying paywall events
//! and log lines outward.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use bridge_types::{
    event::{DELEGATE_ACTION_EVENT, LOG_EVENT, PAYWALL_EVENT},
    DelegateAction, EventSink, LogEntry, ProductIdentity, PurchaseDelegate, StoreClient,
    TransactionStatus,
};

use crate::pending::PendingSlot;
use crate::registry::ModuleRegistry;

/// Wire-format aliases kept for older host consumers.
const COMPAT_ALIASES: [(&str, &str); 4] = [
    ("paywallName", "paywallTemplateName"),
    ("error", "errorDescription"),
    ("productId", "productKey"),
    ("buttonName", "ctaName"),
];

/// Outbound event forwarding shared by both delegate variants.
///
/// Carries the "home" sink, the module instance that initialized the SDK,
/// as the backup delivery target when the currently registered module
/// rejects an event.
pub struct EventForwarder {
    registry: Arc<ModuleRegistry>,
    home: Mutex<Option<Arc<dyn EventSink>>>,
}

impl EventForwarder {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            registry,
            home: Mutex::new(None),
        }
    }

    /// Record the module instance that initiated the current SDK session.
    pub fn set_home(&self, sink: Arc<dyn EventSink>) {
        *self.lock_home() = Some(sink);
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Relay a paywall lifecycle event, adding backwards-compatibility field
    /// aliases. The canonical field always wins: a stale alias carried by the
    /// event itself is overwritten.
    pub fn forward_paywall_event(&self, mut event: Map<String, Value>) {
        for (field, alias) in COMPAT_ALIASES {
            if let Some(value) = event.get(field).cloned() {
                event.insert(alias.to_string(), value);
            }
        }
        self.send(PAYWALL_EVENT, Value::Object(event));
    }

    /// Relay a structured log line. Log traffic is high volume and exempt
    /// from queueing.
    pub fn forward_log(&self, entry: LogEntry) {
        self.registry.send_or_drop(LOG_EVENT, entry.to_payload());
    }

    fn send(&self, name: &str, payload: Value) {
        let home = self.lock_home().clone();
        self.registry.safe_send(name, payload, home.as_ref());
    }

    fn lock_home(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn EventSink>>> {
        self.home.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Delegate that asks the host to execute purchases and restores.
///
/// The pending-operation slots live here, independent of any single module
/// instance, so in-flight requests survive module recreation.
pub struct BridgedDelegate {
    forwarder: Arc<EventForwarder>,
    purchase: PendingSlot<TransactionStatus>,
    restore: PendingSlot<bool>,
}

impl BridgedDelegate {
    pub fn new(forwarder: Arc<EventForwarder>) -> Self {
        Self {
            forwarder,
            purchase: PendingSlot::new(),
            restore: PendingSlot::new(),
        }
    }

    pub fn forwarder(&self) -> &Arc<EventForwarder> {
        &self.forwarder
    }

    /// Host entry point answering a pending purchase.
    ///
    /// Unrecognized tags map to `Failed` with a distinguishable reason; an
    /// answer for an operation that no longer exists (pre-empted or
    /// cancelled) is a logged no-op.
    pub fn resume_purchase(&self, status_tag: &str, error_msg: Option<&str>) {
        let status = TransactionStatus::from_tag(status_tag, error_msg);
        if !self.purchase.complete(status) {
            warn!(tag = status_tag, "Purchase result arrived with no purchase in flight");
        }
    }

    /// Host entry point answering a pending restore.
    pub fn resume_restore(&self, success: bool) {
        if !self.restore.complete(success) {
            warn!(success, "Restore result arrived with no restore in flight");
        }
    }

    pub fn purchase_pending(&self) -> bool {
        self.purchase.is_pending()
    }

    pub fn restore_pending(&self) -> bool {
        self.restore.is_pending()
    }
}

#[async_trait]
impl PurchaseDelegate for BridgedDelegate {
    async fn make_purchase(&self, product: ProductIdentity) -> TransactionStatus {
        // Pre-empt any stale purchase before installing this one.
        let (rx, generation) = self.purchase.begin(TransactionStatus::Cancelled);
        let _cleanup = self.purchase.guard(generation);

        debug!(product_id = %product.product_id, "Requesting purchase from host");
        self.forwarder.send(
            DELEGATE_ACTION_EVENT,
            DelegateAction::Purchase(product).to_payload(),
        );

        match rx.await {
            Ok(status) => status,
            // Sender dropped without an answer: the operation was torn down
            // underneath us.
            Err(_) => TransactionStatus::Failed("purchase request abandoned before a result arrived".into()),
        }
    }

    async fn restore_purchases(&self) -> bool {
        let (rx, generation) = self.restore.begin(false);
        let _cleanup = self.restore.guard(generation);

        debug!("Requesting restore from host");
        self.forwarder
            .send(DELEGATE_ACTION_EVENT, DelegateAction::Restore.to_payload());

        rx.await.unwrap_or(false)
    }

    fn on_paywall_event(&self, event: Map<String, Value>) {
        self.forwarder.forward_paywall_event(event);
    }
}

/// Delegate that fulfils purchases through the platform store client while
/// still forwarding paywall events to the host.
pub struct DefaultDelegate {
    forwarder: Arc<EventForwarder>,
    store: Arc<dyn StoreClient>,
}

impl DefaultDelegate {
    pub fn new(forwarder: Arc<EventForwarder>, store: Arc<dyn StoreClient>) -> Self {
        Self { forwarder, store }
    }
}

#[async_trait]
impl PurchaseDelegate for DefaultDelegate {
    async fn make_purchase(&self, product: ProductIdentity) -> TransactionStatus {
        match self.store.purchase(product).await {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "Store purchase failed");
                TransactionStatus::Failed(err.to_string())
            }
        }
    }

    async fn restore_purchases(&self) -> bool {
        match self.store.restore().await {
            Ok(restored) => restored,
            Err(err) => {
                warn!(error = %err, "Store restore failed");
                false
            }
        }
    }

    fn on_paywall_event(&self, event: Map<String, Value>) {
        self.forwarder.forward_paywall_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::error::Result;
    use bridge_types::{BridgeError, LogLevel};
    use crate::queue::QueuePolicy;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingSink {
        fn delivered(&self) -> Vec<(String, Value)> {
            self.delivered.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn send_event(&self, name: &str, payload: Value) -> Result<()> {
            self.delivered.lock().unwrap().push((name.to_string(), payload));
            Ok(())
        }
    }

    fn forwarder_with_module() -> (Arc<EventForwarder>, Arc<RecordingSink>) {
        let registry = Arc::new(ModuleRegistry::new(QueuePolicy::default()));
        let module = Arc::new(RecordingSink::default());
        registry.register(module.clone());
        (Arc::new(EventForwarder::new(registry)), module)
    }

    #[test]
    fn test_paywall_event_gets_compat_aliases() {
        let (forwarder, module) = forwarder_with_module();

        let mut event = Map::new();
        event.insert("type".into(), json!("paywallOpen"));
        event.insert("paywallName".into(), json!("spring_sale"));
        event.insert("productId".into(), json!("prod_a"));
        forwarder.forward_paywall_event(event);

        let delivered = module.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, PAYWALL_EVENT);
        let payload = &delivered[0].1;
        assert_eq!(payload["paywallTemplateName"], "spring_sale");
        assert_eq!(payload["productKey"], "prod_a");
    }

    #[test]
    fn test_stale_alias_is_overwritten_by_canonical_field() {
        let (forwarder, module) = forwarder_with_module();

        let mut event = Map::new();
        event.insert("error".into(), json!("new"));
        event.insert("errorDescription".into(), json!("stale"));
        event.insert("paywallName".into(), json!("spring_sale"));
        event.insert("paywallTemplateName".into(), json!("stale-template"));
        forwarder.forward_paywall_event(event);

        let payload = &module.delivered()[0].1;
        assert_eq!(payload["errorDescription"], "new");
        assert_eq!(payload["paywallTemplateName"], "spring_sale");
    }

    #[test]
    fn test_log_lines_are_queue_exempt() {
        let registry = Arc::new(ModuleRegistry::new(QueuePolicy::default()));
        let forwarder = EventForwarder::new(registry.clone());

        // No module registered; a log line must be dropped, not buffered.
        forwarder.forward_log(LogEntry::new(LogLevel::Info, "paywall", "opened"));
        assert_eq!(registry.queued_len(), 0);
    }

    #[tokio::test]
    async fn test_resume_purchase_without_pending_is_noop() {
        let (forwarder, _module) = forwarder_with_module();
        let delegate = BridgedDelegate::new(forwarder);

        delegate.resume_purchase("purchased", None);
        assert!(!delegate.purchase_pending());
    }

    #[tokio::test]
    async fn test_make_purchase_resolved_by_resume() {
        let (forwarder, module) = forwarder_with_module();
        let delegate = Arc::new(BridgedDelegate::new(forwarder));

        let task = tokio::spawn({
            let delegate = delegate.clone();
            async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
        });

        // Wait for the outbound request to be emitted.
        while module.delivered().is_empty() {
            tokio::task::yield_now().await;
        }
        let (name, payload) = module.delivered().remove(0);
        assert_eq!(name, DELEGATE_ACTION_EVENT);
        assert_eq!(payload["type"], "purchase");
        assert_eq!(payload["productId"], "prod_a");

        delegate.resume_purchase("purchased", None);
        assert_eq!(task.await.unwrap(), TransactionStatus::Purchased);
        assert!(!delegate.purchase_pending());
    }

    #[tokio::test]
    async fn test_default_delegate_maps_store_errors_to_failed() {
        struct BrokenStore;

        #[async_trait]
        impl StoreClient for BrokenStore {
            async fn purchase(&self, _product: ProductIdentity) -> Result<TransactionStatus> {
                Err(BridgeError::OperationFailed("billing unavailable".into()))
            }

            async fn restore(&self) -> Result<bool> {
                Err(BridgeError::OperationFailed("billing unavailable".into()))
            }
        }

        let (forwarder, _module) = forwarder_with_module();
        let delegate = DefaultDelegate::new(forwarder, Arc::new(BrokenStore));

        match delegate.make_purchase(ProductIdentity::new("prod_a")).await {
            TransactionStatus::Failed(reason) => assert!(reason.contains("billing unavailable")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(!delegate.restore_purchases().await);
    }
}
