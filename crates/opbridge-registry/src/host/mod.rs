//! Default host implementations of every operation.
//!
//! - **[`fs`]** -- `read_file`, `write_file`, `remove_file` over `tokio::fs`,
//!   with optional root-directory confinement.
//! - **[`fetch`]** -- `fetch` over a shared [`reqwest::Client`].
//! - **[`probes`]** -- deterministic marshalling probes.

pub mod fetch;
pub mod fs;
pub mod probes;

use std::sync::Arc;

use crate::config::HostConfig;
use crate::error::Result;
use crate::op::OpName;
use crate::registry::{OpHandler, OpRegistryBuilder};

use self::fetch::Fetcher;
use self::fs::FileOps;

/// Register the default implementation of every operation the config
/// grants.
pub fn register_defaults(
    mut builder: OpRegistryBuilder,
    config: &HostConfig,
) -> Result<OpRegistryBuilder> {
    if config.allow_fs {
        let files = Arc::new(FileOps::new(config.root_dir.clone()));

        let f = Arc::clone(&files);
        builder = builder.register(
            OpName::ReadFile,
            OpHandler::from_async(move |args| {
                let files = Arc::clone(&f);
                async move { files.read_file(args).await }
            }),
        )?;

        let f = Arc::clone(&files);
        builder = builder.register(
            OpName::WriteFile,
            OpHandler::from_async(move |args| {
                let files = Arc::clone(&f);
                async move { files.write_file(args).await }
            }),
        )?;

        builder = builder.register(
            OpName::RemoveFile,
            OpHandler::from_sync(move |args| files.remove_file(&args)),
        )?;
    }

    if config.allow_network {
        let fetcher = Arc::new(Fetcher::new(config));
        builder = builder.register(
            OpName::Fetch,
            OpHandler::from_async(move |args| {
                let fetcher = Arc::clone(&fetcher);
                async move { fetcher.fetch(args).await }
            }),
        )?;
    }

    builder
        .register(OpName::StructToStruct, OpHandler::from_sync(probes::struct_to_struct))?
        .register(OpName::StructToStruct01, OpHandler::from_sync(probes::struct_to_struct_01))?
        .register(OpName::VecToVec, OpHandler::from_sync(probes::vec_to_vec))?
        .register(OpName::TrueToFalse, OpHandler::from_sync(probes::true_to_false))?
        .register(OpName::FloatX3, OpHandler::from_sync(probes::float_x_3))?
        .register(OpName::IntegerX3, OpHandler::from_sync(probes::integer_x_3))
}
