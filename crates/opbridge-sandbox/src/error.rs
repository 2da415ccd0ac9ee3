//! Bridge error types.
//!
//! Everything in here is a *host-side* failure: a registry/bridge mismatch,
//! a bad configuration, an engine that refused the bootstrap.  Runtime
//! failures of individual operations are [`OpError`](opbridge_registry::OpError)
//! values delivered through the call's completion instead.

use opbridge_registry::RegistryError;

use crate::config::ConfigError;

/// Failure reported by a [`ScriptEngine`](crate::engine::ScriptEngine).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unified error type for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A call named an operation the registry does not hold.  This is an
    /// integration defect and is raised before any call is constructed.
    #[error("unknown operation: {op}")]
    UnknownOperation { op: String },

    /// Registry construction failed.
    #[error("registry error: {0}")]
    Registry(RegistryError),

    #[error("invalid bridge configuration: {0}")]
    Config(#[from] ConfigError),

    /// The engine failed to evaluate the bootstrap.
    #[error("script engine error: {0}")]
    Engine(#[from] EngineError),

    /// Asynchronous operations need a tokio runtime to run on.
    #[error("no tokio runtime available for asynchronous operations")]
    NoRuntime,
}

impl From<RegistryError> for BridgeError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownOperation { op } => Self::UnknownOperation { op },
            other => Self::Registry(other),
        }
    }
}

/// Convenience alias used throughout the sandbox crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
