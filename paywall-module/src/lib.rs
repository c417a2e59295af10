//! # Paywall Module Surface
//!
//! Host-facing façade over the bridge protocol core. The
//! [`BridgeContext`](context::BridgeContext) bundles the process-lifetime
//! pieces (delivery registry, pending-operation slots, engine and store
//! handles); [`PaywallModule`](module::PaywallModule) is the per-lifecycle
//! wrapper exposing the bridge operations to the host runtime.
//!
//! ```ignore
//! use std::sync::Arc;
//! use paywall_module::{BridgeContext, PaywallModule};
//!
//! let ctx = Arc::new(BridgeContext::new(engine, data_dir));
//!
//! // The host runtime may create several modules over one process lifetime;
//! // the context survives them all.
//! let module = PaywallModule::new(ctx.clone(), sink);
//! module.on_create();
//! module.initialize(raw_config).await;
//! ```

pub mod context;
pub mod fallback;
pub mod module;

pub use context::BridgeContext;
pub use module::PaywallModule;
