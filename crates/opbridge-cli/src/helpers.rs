//! Shared helpers for the opbridge binary.

use std::io::Write;
use std::path::PathBuf;

use opbridge_sandbox::{EngineError, ScriptEngine};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// Diagnostics go to stderr; stdout carries script output only.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Script sink
// ---------------------------------------------------------------------------

/// A stand-in engine that writes the scripts it is given instead of
/// evaluating them, so the bootstrap can be handed to an external engine.
pub struct ScriptSink {
    out: Option<PathBuf>,
}

impl ScriptSink {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }
}

impl ScriptEngine for ScriptSink {
    fn execute_script(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        let written = match &self.out {
            Some(path) => std::fs::write(path, source)
                .map_err(|e| EngineError::new(format!("{}: {e}", path.display()))),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(source.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|e| EngineError::new(format!("stdout: {e}")))
            }
        };
        if written.is_ok() {
            tracing::debug!(script = name, bytes = source.len(), "bootstrap script written");
        }
        written
    }
}
