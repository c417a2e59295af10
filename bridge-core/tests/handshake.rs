//! End-to-end purchase/restore handshake scenarios.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use bridge_core::{BridgedDelegate, EventForwarder, ModuleRegistry, QueuePolicy};
use bridge_types::error::Result;
use bridge_types::event::DELEGATE_ACTION_EVENT;
use bridge_types::{EventSink, ProductIdentity, PurchaseDelegate, TransactionStatus};

#[derive(Default)]
struct HostModule {
    received: Mutex<Vec<(String, Value)>>,
}

impl HostModule {
    fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().unwrap().clone()
    }
}

impl EventSink for HostModule {
    fn send_event(&self, name: &str, payload: Value) -> Result<()> {
        self.received.lock().unwrap().push((name.to_string(), payload));
        Ok(())
    }
}

fn wired_delegate() -> (Arc<BridgedDelegate>, Arc<HostModule>) {
    let registry = Arc::new(ModuleRegistry::new(QueuePolicy::default()));
    let module = Arc::new(HostModule::default());
    registry.register(module.clone());
    let forwarder = Arc::new(EventForwarder::new(registry));
    forwarder.set_home(module.clone());
    (Arc::new(BridgedDelegate::new(forwarder)), module)
}

async fn wait_for_events(module: &HostModule, count: usize) {
    while module.received().len() < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn purchase_request_resolves_with_host_answer() {
    let (delegate, module) = wired_delegate();

    let purchase = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });

    wait_for_events(&module, 1).await;
    let (name, payload) = module.received().remove(0);
    assert_eq!(name, DELEGATE_ACTION_EVENT);
    assert_eq!(payload["type"], "purchase");
    assert_eq!(payload["productId"], "prod_a");

    delegate.resume_purchase("purchased", None);

    assert_eq!(purchase.await.unwrap(), TransactionStatus::Purchased);
    assert!(!delegate.purchase_pending());
}

#[tokio::test]
async fn second_purchase_preempts_first_with_cancelled() {
    let (delegate, module) = wired_delegate();

    let first = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });
    wait_for_events(&module, 1).await;

    let second = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_b")).await }
    });
    wait_for_events(&module, 2).await;

    // Caller A resolves with Cancelled before B's operation is answered.
    assert_eq!(first.await.unwrap(), TransactionStatus::Cancelled);

    delegate.resume_purchase("purchased", None);
    assert_eq!(second.await.unwrap(), TransactionStatus::Purchased);

    let events = module.received();
    assert_eq!(events[1].1["productId"], "prod_b");
}

#[tokio::test]
async fn duplicate_resume_is_a_noop() {
    let (delegate, module) = wired_delegate();

    let purchase = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });
    wait_for_events(&module, 1).await;

    delegate.resume_purchase("purchased", None);
    // Second answer arrives after the slot was cleared; must not panic or
    // resume anything twice.
    delegate.resume_purchase("cancelled", None);

    assert_eq!(purchase.await.unwrap(), TransactionStatus::Purchased);
}

#[tokio::test]
async fn unknown_status_tag_resolves_to_distinguishable_failure() {
    let (delegate, module) = wired_delegate();

    let purchase = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });
    wait_for_events(&module, 1).await;

    delegate.resume_purchase("bogus", Some("should not be used"));

    match purchase.await.unwrap() {
        TransactionStatus::Failed(reason) => {
            assert!(reason.contains("unknown purchase status"));
            assert!(reason.contains("bogus"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn restore_round_trip() {
    let (delegate, module) = wired_delegate();

    let restore = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.restore_purchases().await }
    });

    wait_for_events(&module, 1).await;
    assert_eq!(module.received()[0].1["type"], "restore");

    delegate.resume_restore(true);
    assert!(restore.await.unwrap());
    assert!(!delegate.restore_pending());
}

#[tokio::test]
async fn second_restore_preempts_first_with_false() {
    let (delegate, module) = wired_delegate();

    let first = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.restore_purchases().await }
    });
    wait_for_events(&module, 1).await;

    let second = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.restore_purchases().await }
    });
    wait_for_events(&module, 2).await;

    assert!(!first.await.unwrap());

    delegate.resume_restore(true);
    assert!(second.await.unwrap());
}

#[tokio::test]
async fn cancelled_purchase_clears_slot_for_next_attempt() {
    let (delegate, module) = wired_delegate();

    let first = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });
    wait_for_events(&module, 1).await;

    // Host runtime cancels the suspended caller.
    first.abort();
    assert!(first.await.is_err());

    // Slot cleanup ran as a cancellation side effect, so the next attempt
    // starts clean instead of pre-empting a ghost.
    while delegate.purchase_pending() {
        tokio::task::yield_now().await;
    }

    let second = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_b")).await }
    });
    wait_for_events(&module, 2).await;

    delegate.resume_purchase("purchased", None);
    assert_eq!(second.await.unwrap(), TransactionStatus::Purchased);
}

#[tokio::test]
async fn purchase_request_queued_until_module_registers() {
    // No module live when the purchase is requested.
    let registry = Arc::new(ModuleRegistry::new(QueuePolicy::default()));
    let forwarder = Arc::new(EventForwarder::new(registry.clone()));
    let delegate = Arc::new(BridgedDelegate::new(forwarder));

    let purchase = tokio::spawn({
        let delegate = delegate.clone();
        async move { delegate.make_purchase(ProductIdentity::new("prod_a")).await }
    });

    while registry.queued_len() == 0 {
        tokio::task::yield_now().await;
    }

    // A module comes up (e.g. after hot reload) and flushes the queue.
    let module = Arc::new(HostModule::default());
    let module_dyn: Arc<dyn EventSink> = module.clone();
    registry.register(module_dyn.clone());
    registry.flush(&module_dyn);

    let events = module.received();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1["type"], "purchase");

    delegate.resume_purchase("purchased", None);
    assert_eq!(purchase.await.unwrap(), TransactionStatus::Purchased);
}
