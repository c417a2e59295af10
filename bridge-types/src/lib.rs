//! # Paywall Bridge Contract Types
//!
//! Shared types and traits between the bridge protocol core and the
//! host-facing module surface.
//!
//! ## Overview
//!
//! This crate defines the contract the bridge is built around:
//!
//! - [`EventSink`](delegate::EventSink) - a live host module instance that
//!   can receive outbound events
//! - [`PurchaseDelegate`](delegate::PurchaseDelegate) - the delegate the
//!   paywall engine drives for purchase/restore
//! - [`PaywallEngine`](delegate::PaywallEngine) - the closed-source native
//!   paywall engine, consumed interface only
//! - [`StoreClient`](delegate::StoreClient) - the store billing client used
//!   by the default delegate
//! - Wire types: [`TransactionStatus`](status::TransactionStatus),
//!   [`DownloadStatus`](status::DownloadStatus),
//!   [`ProductIdentity`](event::ProductIdentity),
//!   [`DelegateAction`](event::DelegateAction), configuration records, and
//!   the boolean marker codec
//! - Utilities: [`Clock`](time::Clock) time source and structured
//!   [`LogEntry`](time::LogEntry) log lines
//!
//! ## Error Handling
//!
//! All fallible operations use [`BridgeError`](error::BridgeError).
//! Best-effort delivery paths never surface errors to the producer.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; implementations are shared freely
//! across async tasks.

pub mod config;
pub mod delegate;
pub mod error;
pub mod event;
pub mod marker;
pub mod status;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use config::{Environment, FallbackSource, LightDarkMode, PaywallConfig, PaywallLoadingConfig};
pub use delegate::{
    EngineInitConfig, EventSink, PaywallEngine, PresentationEventHandler, PurchaseDelegate,
    StoreClient,
};
pub use event::{DelegateAction, ProductIdentity};
pub use status::{CanPresentResult, DownloadStatus, PaywallInfoResult, TransactionStatus};
pub use time::{Clock, LogEntry, LogLevel, SystemClock};
