//! Request/response dispatch between the script side and the registry.
//!
//! Every call names an operation and carries marshalled arguments.  The
//! name is resolved first; an unknown name is a [`BridgeError`] and no call
//! record is created.  Synchronous operations then run inline and come back
//! as [`OpCompletion::Ready`].  Asynchronous operations are spawned onto the
//! tokio runtime and come back as a [`PendingCall`], which resolves exactly
//! once with the operation's value or its [`OpError`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use uuid::Uuid;

use opbridge_registry::{OpError, OpHandler, OpName, OpRegistry, OpResult};

use crate::error::{BridgeError, Result};

/// Identifier of one dispatched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of [`Bridge::dispatch`].
#[derive(Debug)]
pub enum OpCompletion {
    /// A synchronous operation already ran.
    Ready(OpResult<Value>),
    /// An asynchronous operation is in flight.
    Pending(PendingCall),
}

impl OpCompletion {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Wait for the result, whichever kind of completion this is.
    pub async fn resolve(self) -> OpResult<Value> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(call) => call.await,
        }
    }
}

/// Handle to one in-flight asynchronous call.
///
/// Resolves exactly once.  Dropping it abandons the call: the host task
/// still runs to completion but its result is discarded.
#[derive(Debug)]
pub struct PendingCall {
    call_id: CallId,
    op: OpName,
    issued_at: DateTime<Utc>,
    rx: oneshot::Receiver<OpResult<Value>>,
}

impl PendingCall {
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    pub fn op(&self) -> OpName {
        self.op
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl Future for PendingCall {
    type Output = OpResult<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let op = self.op;
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(OpError::cancelled(format!(
                    "{} was dropped by the host before completing",
                    op.script_name()
                )))
            })
        })
    }
}

/// Routes calls to the registry.
///
/// Cheap to clone; every clone shares the same registry and runtime.
#[derive(Debug, Clone)]
pub struct Bridge {
    registry: Arc<OpRegistry>,
    runtime: Handle,
}

impl Bridge {
    /// Bind to the tokio runtime the caller is running inside.
    pub fn new(registry: Arc<OpRegistry>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| BridgeError::NoRuntime)?;
        Ok(Self::with_runtime(registry, runtime))
    }

    pub fn with_runtime(registry: Arc<OpRegistry>, runtime: Handle) -> Self {
        Self { registry, runtime }
    }

    pub fn registry(&self) -> &Arc<OpRegistry> {
        &self.registry
    }

    /// Issue one call.
    ///
    /// `op` may be an op identifier (`op_read_file`) or a script member name
    /// (`readFile`).  Only an unknown name fails here; every other failure
    /// is delivered through the completion.
    pub fn dispatch(&self, op: &str, args: Vec<Value>) -> Result<OpCompletion> {
        let registered = self.registry.resolve(op)?;
        let name = registered.name();
        let call_id = CallId::new();
        tracing::debug!(op = %name, call_id = %call_id, args = args.len(), "dispatch");

        let validated = registered.descriptor.validate_args(&args);

        match &registered.handler {
            OpHandler::Sync(f) => {
                let result = validated.and_then(|()| f(args));
                tracing::trace!(op = %name, call_id = %call_id, ok = result.is_ok(), "completed");
                Ok(OpCompletion::Ready(result))
            }
            OpHandler::Async(f) => {
                let (tx, rx) = oneshot::channel();
                let pending = PendingCall {
                    call_id,
                    op: name,
                    issued_at: Utc::now(),
                    rx,
                };
                match validated {
                    Err(e) => {
                        // The receiver is still held by `pending`.
                        let _ = tx.send(Err(e));
                    }
                    Ok(()) => {
                        let fut = f(args);
                        self.runtime.spawn(async move {
                            let result = fut.await;
                            tracing::trace!(op = %name, call_id = %call_id, ok = result.is_ok(), "completed");
                            if tx.send(result).is_err() {
                                tracing::warn!(
                                    op = %name,
                                    call_id = %call_id,
                                    "call abandoned by the script side, result discarded"
                                );
                            }
                        });
                    }
                }
                Ok(OpCompletion::Pending(pending))
            }
        }
    }
}
