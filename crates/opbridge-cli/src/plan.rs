//! Call plans: a scripted sequence of namespace calls.
//!
//! A plan is a JSON array of steps.  Each step is issued in order and
//! awaited before the next one; its value is logged on the standard stream
//! and its error, if any, on the error stream.  A failing step never stops
//! the plan.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use opbridge_registry::{ErrorKind, OpError};
use opbridge_sandbox::{BridgeError, Sandbox};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanStep {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

pub fn parse_plan(raw: &str) -> Result<Vec<PlanStep>> {
    serde_json::from_str(raw).context("a plan must be a JSON array of { \"op\", \"args\" } steps")
}

/// Parse the optional `ARGS_JSON` of `opbridge call`.
pub fn parse_args(raw: Option<&str>) -> Result<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let value: Value = serde_json::from_str(raw).context("arguments must be valid JSON")?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Issue one call and log its outcome through the sandbox console.
///
/// Returns whether the call succeeded.
pub async fn run_step(sandbox: &Sandbox, step: &PlanStep) -> bool {
    let outcome = match sandbox.call(&step.op, step.args.clone()).await {
        Ok(result) => result,
        // Dispatch only fails fast on a name the registry does not hold.
        Err(err @ BridgeError::UnknownOperation { .. }) => {
            Err(OpError::new(ErrorKind::UnknownOperation, err.to_string()))
        }
        // Host-side defect, not an operation outcome: nothing reaches the
        // script-facing error stream.
        Err(err) => {
            tracing::error!(op = %step.op, error = %err, "bridge failure, step skipped");
            return false;
        }
    };
    match outcome {
        Ok(value) => {
            sandbox.console().log(&[Value::String(step.op.clone()), value]);
            true
        }
        Err(err) => {
            tracing::debug!(op = %step.op, error = %err, "plan step failed");
            sandbox
                .console()
                .error(&[Value::String(step.op.clone()), err.to_value()]);
            false
        }
    }
}

pub async fn run_plan(sandbox: &Sandbox, steps: &[PlanStep]) -> PlanReport {
    let mut report = PlanReport::default();
    for step in steps {
        if run_step(sandbox, step).await {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
    }
    report
}
