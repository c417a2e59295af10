//! Bridge Context
//!
//! Process-lifetime state shared by every module instance the host runtime
//! creates: the delivery registry, the pending-operation slots (owned by the
//! bridged delegate), the paywall engine handle, and the optional store
//! client. Explicitly constructed and injected rather than hidden behind a
//! global, while still outliving any single module-instance wrapper.

use std::path::PathBuf;
use std::sync::Arc;

use bridge_core::{BridgedDelegate, EventForwarder, ModuleRegistry, QueuePolicy};
use bridge_types::{Clock, PaywallEngine, StoreClient, SystemClock};

pub struct BridgeContext {
    registry: Arc<ModuleRegistry>,
    delegate: Arc<BridgedDelegate>,
    engine: Arc<dyn PaywallEngine>,
    store: Option<Arc<dyn StoreClient>>,
    data_dir: PathBuf,
}

impl BridgeContext {
    /// Create a context with the default queue policy and system clock, and
    /// no store client (the bridged delegate is the only purchase path).
    pub fn new(engine: Arc<dyn PaywallEngine>, data_dir: PathBuf) -> Self {
        Self::with_parts(
            engine,
            data_dir,
            None,
            QueuePolicy::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create a context with a store client available for the default
    /// delegate.
    pub fn with_store(
        engine: Arc<dyn PaywallEngine>,
        data_dir: PathBuf,
        store: Arc<dyn StoreClient>,
    ) -> Self {
        Self::with_parts(
            engine,
            data_dir,
            Some(store),
            QueuePolicy::default(),
            Arc::new(SystemClock),
        )
    }

    /// Fully parameterized constructor.
    pub fn with_parts(
        engine: Arc<dyn PaywallEngine>,
        data_dir: PathBuf,
        store: Option<Arc<dyn StoreClient>>,
        policy: QueuePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Arc::new(ModuleRegistry::with_clock(policy, clock));
        let forwarder = Arc::new(EventForwarder::new(registry.clone()));
        Self {
            registry,
            delegate: Arc::new(BridgedDelegate::new(forwarder)),
            engine,
            store,
            data_dir,
        }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The bridged delegate. Always constructed, even when the default
    /// delegate is selected for the engine, so resume entry points have a
    /// stable target across module churn.
    pub fn delegate(&self) -> &Arc<BridgedDelegate> {
        &self.delegate
    }

    pub fn engine(&self) -> &Arc<dyn PaywallEngine> {
        &self.engine
    }

    pub fn store(&self) -> Option<&Arc<dyn StoreClient>> {
        self.store.as_ref()
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}
