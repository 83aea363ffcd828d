//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed to by
//! [`CommandDispatcher`].

pub mod configure;
pub mod decide;
pub mod dispatcher;
pub mod download;
pub mod env;
pub mod locate;
pub mod schema;
pub mod signature;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use crate::env::{Environment, SCRATCH_DIR};
use crate::probe::CcBackend;
use crate::tools::ToolLoader;
use std::path::Path;
use std::sync::Arc;

/// An environment that resolves tools relative to `root` and keeps its
/// compile probes under `root/.confprobe`.
pub(crate) fn project_environment(name: &str, root: &Path) -> Environment {
    Environment::new(name)
        .with_loader(ToolLoader::new(root))
        .with_backend(Arc::new(CcBackend::new(root.join(SCRATCH_DIR))))
}
