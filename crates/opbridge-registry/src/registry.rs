//! The operation registry.
//!
//! [`OpRegistry`] is the authoritative list of capabilities the host grants
//! to one sandbox.  It is assembled through [`OpRegistryBuilder`], which
//! rejects duplicate registrations, and is immutable afterwards: the bridge
//! holds it behind an `Arc` and only ever reads from it.
//!
//! # Example
//!
//! ```rust
//! # use opbridge_registry::{OpHandler, OpName, OpRegistry};
//! # use serde_json::{json, Value};
//! let registry = OpRegistry::builder()
//!     .register(
//!         OpName::TrueToFalse,
//!         OpHandler::from_sync(|args: Vec<Value>| Ok(json!(!args[0].as_bool().unwrap_or(false)))),
//!     )
//!     .unwrap()
//!     .build();
//!
//! assert!(registry.contains(OpName::TrueToFalse));
//! assert!(registry.resolve("op_fetch").is_err());
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::config::HostConfig;
use crate::error::{OpResult, RegistryError, Result};
use crate::host;
use crate::op::{OpDescriptor, OpName, Synchronicity};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Boxed future returned by an asynchronous operation.
pub type OpFuture = Pin<Box<dyn Future<Output = OpResult<Value>> + Send>>;

/// An operation that completes inline on the calling thread.
pub type SyncOpFn = Arc<dyn Fn(Vec<Value>) -> OpResult<Value> + Send + Sync>;

/// An operation that completes off the calling thread.
///
/// The future is `'static` so the bridge can hand it to a tokio task.
pub type AsyncOpFn = Arc<dyn Fn(Vec<Value>) -> OpFuture + Send + Sync>;

/// Host-side implementation of one operation.
#[derive(Clone)]
pub enum OpHandler {
    Sync(SyncOpFn),
    Async(AsyncOpFn),
}

impl OpHandler {
    /// Wrap a synchronous closure.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> OpResult<Value> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wrap a closure returning a future.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Value>> + Send + 'static,
    {
        Self::Async(Arc::new(move |args| Box::pin(f(args))))
    }

    pub fn synchronicity(&self) -> Synchronicity {
        match self {
            Self::Sync(_) => Synchronicity::Sync,
            Self::Async(_) => Synchronicity::Async,
        }
    }
}

impl std::fmt::Debug for OpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpHandler::{}", self.synchronicity())
    }
}

/// A descriptor paired with its implementation.
#[derive(Debug, Clone)]
pub struct RegisteredOp {
    pub descriptor: OpDescriptor,
    pub handler: OpHandler,
}

impl RegisteredOp {
    pub fn name(&self) -> OpName {
        self.descriptor.name
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable mapping from [`OpName`] to host implementation.
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    ops: BTreeMap<OpName, RegisteredOp>,
}

impl OpRegistry {
    /// Start assembling a registry.
    pub fn builder() -> OpRegistryBuilder {
        OpRegistryBuilder::default()
    }

    /// Registry holding the default host implementations, filtered by the
    /// capability grants in `config`.
    pub fn standard(config: &HostConfig) -> Result<Self> {
        let builder = host::register_defaults(Self::builder(), config)?;
        let registry = builder.build();
        tracing::info!(
            ops = registry.len(),
            allow_fs = config.allow_fs,
            allow_network = config.allow_network,
            "op registry built"
        );
        Ok(registry)
    }

    pub fn get(&self, name: OpName) -> Option<&RegisteredOp> {
        self.ops.get(&name)
    }

    pub fn contains(&self, name: OpName) -> bool {
        self.ops.contains_key(&name)
    }

    /// Look up an operation by op identifier or script member name.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredOp> {
        let op: OpName = name.parse()?;
        self.ops
            .get(&op)
            .ok_or_else(|| RegistryError::UnknownOperation {
                op: name.to_string(),
            })
    }

    /// Descriptors of every registered operation, in namespace order.
    pub fn descriptors(&self) -> impl Iterator<Item = &OpDescriptor> {
        self.ops.values().map(|op| &op.descriptor)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Validate `args` and run the operation to completion, whatever its
    /// synchronicity.
    ///
    /// This is the uniform host-side entry point; the bridge uses the
    /// handlers directly so it can keep sync results synchronous.
    pub async fn invoke(&self, name: OpName, args: Vec<Value>) -> Result<OpResult<Value>> {
        let op = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownOperation {
                op: name.op_id().to_string(),
            })?;
        if let Err(e) = op.descriptor.validate_args(&args) {
            return Ok(Err(e));
        }
        let result = match &op.handler {
            OpHandler::Sync(f) => f(args),
            OpHandler::Async(f) => f(args).await,
        };
        Ok(result)
    }
}

/// Builder for [`OpRegistry`].
#[derive(Debug, Default)]
pub struct OpRegistryBuilder {
    ops: BTreeMap<OpName, RegisteredOp>,
}

impl OpRegistryBuilder {
    /// Register `handler` as the implementation of `name`.
    ///
    /// Registering the same name twice is a host configuration error.
    pub fn register(mut self, name: OpName, handler: OpHandler) -> Result<Self> {
        if self.ops.contains_key(&name) {
            return Err(RegistryError::DuplicateOperation {
                op: name.op_id().to_string(),
            });
        }
        let descriptor = OpDescriptor::new(name, handler.synchronicity());
        tracing::debug!(op = %name, synchronicity = %descriptor.synchronicity, "op registered");
        self.ops.insert(
            name,
            RegisteredOp {
                descriptor,
                handler,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> OpRegistry {
        OpRegistry { ops: self.ops }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
