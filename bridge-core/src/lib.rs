//! # Bridge Protocol Core
//!
//! The purchase/restore handshake and event-delivery reliability protocol
//! between the native paywall engine and an asynchronous host runtime.
//!
//! ## Overview
//!
//! The host runtime may tear down and recreate its bridge module instance at
//! any time (hot reload, backgrounding) while a purchase or restore is in
//! flight. This crate provides the pieces that make the handshake survive
//! that churn:
//!
//! - [`PendingSlot`](pending::PendingSlot) - a single-slot holder parking
//!   one suspended caller per operation kind, with pre-emption and
//!   cancellation cleanup
//! - [`ModuleRegistry`](registry::ModuleRegistry) - tracks the live module
//!   instance and delivers outbound events with a backup-module and
//!   bounded-queue fallback chain
//! - [`BridgedDelegate`](delegate::BridgedDelegate) /
//!   [`DefaultDelegate`](delegate::DefaultDelegate) - the two purchase
//!   delegate variants, sharing the
//!   [`EventForwarder`](delegate::EventForwarder) capability
//!
//! ## Concurrency
//!
//! Suspension is cooperative (one-shot channels). The adapter itself
//! enforces no timeout; a pending operation is only ever displaced by the
//! next request of the same kind. All shared state sits behind coarse
//! mutexes, and sinks are never invoked while a registry lock is held.

pub mod delegate;
pub mod pending;
pub mod queue;
pub mod registry;

pub use delegate::{BridgedDelegate, DefaultDelegate, EventForwarder};
pub use pending::{PendingSlot, SlotGuard};
pub use queue::QueuePolicy;
pub use registry::ModuleRegistry;
