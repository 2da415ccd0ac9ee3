//! CLI entry point for opbridge.
//!
//! This binary provides the `opbridge` command: it builds the operation
//! registry from configuration, sets up a sandbox over it, and lets an
//! operator inspect the registry, emit the bootstrap, or drive calls through
//! the bridge.

mod cli;
mod config;
mod helpers;
mod plan;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use opbridge_registry::OpRegistry;
use opbridge_sandbox::{Sandbox, StdioPrint};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{ScriptSink, init_tracing};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    let config = AppConfig::load(cli.config.as_deref())?;
    let registry = OpRegistry::standard(&config.host).context("failed to build op registry")?;
    let sandbox = Sandbox::new(config.bridge, Arc::new(registry), Arc::new(StdioPrint))
        .context("failed to set up sandbox")?;

    match cli.command {
        Commands::Ops => cmd_ops(&sandbox),
        Commands::Bootstrap { out } => cmd_bootstrap(sandbox, out.as_deref()),
        Commands::Call { op, args } => cmd_call(&sandbox, &op, args.as_deref()).await,
        Commands::Run { plan } => cmd_run(&sandbox, &plan).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn cmd_ops(sandbox: &Sandbox) -> Result<()> {
    println!("{} ({} ops)", sandbox.namespace().name(), sandbox.namespace().len());
    for entry in sandbox.namespace().entries() {
        println!(
            "  {:<16} {:<6} {}",
            entry.op().op_id(),
            entry.synchronicity().to_string(),
            entry.descriptor.signature()
        );
    }
    Ok(())
}

fn cmd_bootstrap(mut sandbox: Sandbox, out: Option<&Path>) -> Result<()> {
    let mut sink = ScriptSink::new(out.map(Path::to_path_buf));
    sandbox
        .bootstrap(&mut sink)
        .context("failed to emit bootstrap script")?;
    if let Some(out) = out {
        tracing::info!(path = %out.display(), "bootstrap script written");
    }
    Ok(())
}

async fn cmd_call(sandbox: &Sandbox, op: &str, args: Option<&str>) -> Result<()> {
    let args = plan::parse_args(args)?;
    let result = sandbox.call(op, args).await?;
    match result {
        Ok(value) => {
            sandbox.console().log(&[value]);
            Ok(())
        }
        Err(err) => {
            sandbox.console().error(&[err.to_value()]);
            bail!("{op} failed: {err}");
        }
    }
}

async fn cmd_run(sandbox: &Sandbox, path: &Path) -> Result<()> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read plan from stdin")?;
        raw
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?
    };
    let steps = plan::parse_plan(&raw)?;
    tracing::info!(steps = steps.len(), "running plan");

    let report = plan::run_plan(sandbox, &steps).await;
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "plan finished"
    );
    if report.failed > 0 {
        bail!("{} of {} steps failed", report.failed, steps.len());
    }
    Ok(())
}
