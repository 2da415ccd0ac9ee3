//! CLI argument definitions for opbridge.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// opbridge -- host/script bridge.
#[derive(Parser)]
#[command(
    name = "opbridge",
    version,
    about = "opbridge -- host operations for a sandboxed script engine",
    long_about = "Builds the operation registry, generates the sandbox bootstrap, and \
                  invokes host operations through the same bridge a script engine uses."
)]
pub struct Cli {
    /// Path to a TOML configuration file with `[host]` and `[bridge]` tables.
    /// Falls back to `OPBRIDGE_CONFIG`, then to built-in defaults.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered operations and their signatures.
    Ops,

    /// Generate the bootstrap script.
    Bootstrap {
        /// Write the script to this file instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Invoke a single operation and print its result.
    Call {
        /// Op identifier (`op_read_file`) or namespace member (`readFile`).
        op: String,

        /// Arguments as a JSON array.  A non-array value is passed as the
        /// single argument.
        args: Option<String>,
    },

    /// Run a JSON call plan: an array of `{ "op": ..., "args": [...] }`.
    Run {
        /// Plan file, or `-` for stdin.
        plan: PathBuf,
    },
}
