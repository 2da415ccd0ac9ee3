//! Operation registry for the opbridge host/script bridge.
//!
//! This crate holds everything the host side needs to grant capabilities to
//! a sandboxed script:
//!
//! - **[`op`]** -- the closed set of [`OpName`]s, their declared parameter
//!   and result [`ValueShape`]s, and [`OpDescriptor`].
//! - **[`registry`]** -- [`OpRegistry`], the immutable name -> handler map,
//!   and its builder.
//! - **[`host`]** -- default implementations: file I/O over `tokio::fs`,
//!   `fetch` over `reqwest`, and the marshalling probes.
//! - **[`marshal`]** -- conversion helpers between marshalled values and
//!   Rust types.
//! - **[`config`]** -- [`HostConfig`] capability grants and limits.
//! - **[`error`]** -- [`OpError`] (crosses the boundary) and
//!   [`RegistryError`] (host configuration defects).
//!
//! The registry never looks at script content; it only maps names to
//! implementations and runs them.

pub mod config;
pub mod error;
pub mod host;
pub mod marshal;
pub mod op;
pub mod registry;

pub use config::HostConfig;
pub use error::{ErrorKind, OpError, OpResult, RegistryError, Result};
pub use host::probes::ProbeRecord;
pub use op::{FieldSpec, OpDescriptor, OpName, ParamSpec, Synchronicity, ValueShape};
pub use registry::{
    AsyncOpFn, OpFuture, OpHandler, OpRegistry, OpRegistryBuilder, RegisteredOp, SyncOpFn,
};
