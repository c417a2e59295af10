//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the
//! individual workspace crates (`bridge-types`, `bridge-core`,
//! `paywall-module`). Host applications can depend on `paywall-bridge` and
//! enable the documented features without wiring each crate individually.

pub use bridge_types;

#[cfg(feature = "core")]
pub use bridge_core;

#[cfg(feature = "module")]
pub use paywall_module;
