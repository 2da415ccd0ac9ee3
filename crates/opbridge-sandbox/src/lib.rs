//! Bootstrap and bridge layer for the opbridge host/script bridge.
//!
//! This crate turns an [`OpRegistry`](opbridge_registry::OpRegistry) into a
//! usable sandbox surface:
//!
//! - **[`bootstrap`]** -- generates the script that installs `console` and
//!   the capability namespace inside the engine.
//! - **[`console`]** -- [`Console`] renders stream-tagged lines and writes
//!   them through a single [`HostPrint`] primitive.
//! - **[`namespace`]** -- [`CapabilityNamespace`], one member per registered
//!   operation.
//! - **[`dispatch`]** -- [`Bridge`] routes calls to the registry and hands
//!   back [`OpCompletion`]s; asynchronous results arrive through a
//!   [`PendingCall`].
//! - **[`sandbox`]** -- [`Sandbox`] ties the pieces together for one engine.
//! - **[`engine`]** -- the [`ScriptEngine`] seam.
//! - **[`config`]** -- [`BridgeConfig`] naming.
//! - **[`error`]** -- [`BridgeError`] for host-side defects.
//!
//! Failures of individual operations are never `BridgeError`s; they are
//! [`OpError`](opbridge_registry::OpError) values delivered as the result of
//! the call.

pub mod bootstrap;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod namespace;
pub mod sandbox;

pub use bootstrap::{BOOTSTRAP_MARKER, bootstrap_script};
pub use config::{BridgeConfig, ConfigError};
pub use console::{CapturedPrint, Console, HostPrint, PrintedText, StdioPrint, Stream, format_values};
pub use dispatch::{Bridge, CallId, OpCompletion, PendingCall};
pub use engine::ScriptEngine;
pub use error::{BridgeError, EngineError, Result};
pub use namespace::{CapabilityNamespace, NamespaceEntry};
pub use sandbox::Sandbox;
