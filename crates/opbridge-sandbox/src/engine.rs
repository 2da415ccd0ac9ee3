//! The seam between the bridge and a script engine.

use crate::error::EngineError;

/// An embedded script engine, as far as the bridge is concerned.
///
/// The bridge only ever asks an engine to evaluate the bootstrap.  Wiring
/// the engine's `print` binding to [`Sandbox::console`](crate::Sandbox::console)
/// and its op bindings to [`Sandbox::dispatch`](crate::Sandbox::dispatch) is
/// the embedder's job.
pub trait ScriptEngine {
    /// Evaluate `source` in the global scope, reporting it under `name`.
    fn execute_script(&mut self, name: &str, source: &str) -> Result<(), EngineError>;
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for &mut E {
    fn execute_script(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        (**self).execute_script(name, source)
    }
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Box<E> {
    fn execute_script(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        (**self).execute_script(name, source)
    }
}
