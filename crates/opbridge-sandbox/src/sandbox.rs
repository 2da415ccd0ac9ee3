//! One sandbox instance.
//!
//! A [`Sandbox`] owns everything a single embedded engine needs from the
//! host: the capability namespace derived from its registry, the console
//! its print binding writes through, the bridge its op bindings dispatch
//! through, and the generated bootstrap.  Instances share nothing mutable,
//! so any number can live in one process.

use std::sync::Arc;

use serde_json::Value;

use opbridge_registry::{OpRegistry, OpResult};

use crate::bootstrap::bootstrap_script;
use crate::config::BridgeConfig;
use crate::console::{Console, HostPrint};
use crate::dispatch::{Bridge, OpCompletion};
use crate::engine::ScriptEngine;
use crate::error::Result;
use crate::namespace::CapabilityNamespace;

#[derive(Debug)]
pub struct Sandbox {
    config: BridgeConfig,
    bridge: Bridge,
    namespace: CapabilityNamespace,
    console: Console,
    script: String,
    bootstrapped: bool,
}

impl Sandbox {
    /// Build a sandbox over `registry`.
    ///
    /// Must be called from inside a tokio runtime; asynchronous operations
    /// are spawned onto it.
    pub fn new(
        config: BridgeConfig,
        registry: Arc<OpRegistry>,
        printer: Arc<dyn HostPrint>,
    ) -> Result<Self> {
        config.validate()?;
        let namespace = CapabilityNamespace::from_registry(config.namespace.clone(), &registry);
        let script = bootstrap_script(&namespace, &config);
        let bridge = Bridge::new(registry)?;
        Ok(Self {
            config,
            bridge,
            namespace,
            console: Console::new(printer),
            script,
            bootstrapped: false,
        })
    }

    /// Install the logging surface and the capability namespace into
    /// `engine`.
    ///
    /// Runs the bootstrap at most once per instance.  If the engine rejects
    /// it the sandbox stays un-bootstrapped and the call may be retried.
    pub fn bootstrap<E: ScriptEngine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        if self.bootstrapped {
            tracing::debug!(namespace = %self.namespace.name(), "sandbox already bootstrapped");
            return Ok(());
        }
        engine.execute_script(&self.config.script_name, &self.script)?;
        self.bootstrapped = true;
        tracing::info!(
            namespace = %self.namespace.name(),
            ops = self.namespace.len(),
            "sandbox bootstrapped"
        );
        Ok(())
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn bootstrap_script(&self) -> &str {
        &self.script
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn namespace(&self) -> &CapabilityNamespace {
        &self.namespace
    }

    pub fn registry(&self) -> &Arc<OpRegistry> {
        self.bridge.registry()
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Issue one call; see [`Bridge::dispatch`].
    pub fn dispatch(&self, op: &str, args: Vec<Value>) -> Result<OpCompletion> {
        self.bridge.dispatch(op, args)
    }

    /// Issue one call and wait for its result.
    pub async fn call(&self, op: &str, args: Vec<Value>) -> Result<OpResult<Value>> {
        let completion = self.dispatch(op, args)?;
        Ok(completion.resolve().await)
    }
}
