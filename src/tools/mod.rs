//! Loadable tools.
//!
//! A tool is a named unit that, when loaded, registers probes and
//! configuration methods into an [`Environment`] and may load further tools.
//! Tools are found by a [`ToolLoader`] walking a list of search directories
//! and asking each [`ToolFactory`] whether a directory provides the tool.
//!
//! # Resolution Order
//!
//! For a tool named `demo` (first match wins):
//! 1. Paths passed explicitly to the load call
//! 2. The environment's search paths (directories of tools being loaded)
//! 3. `$DEMO_HOME/config`
//! 4. The directory holding the `confprobe` executable
//! 5. `./config` in the project directory
//! 6. Tools built into the binary
//!
//! # Example
//!
//! ```
//! use confprobe::env::{Environment, MapVars};
//!
//! let mut env = Environment::new("build").with_vars(MapVars::new());
//! assert!(env.load_tool("osx").unwrap());
//! assert!(env.is_loaded("osx"));
//! assert!(env.probe("check_osx_framework").is_some());
//! ```

pub mod builtin;
pub mod loader;
pub mod manifest;

pub use builtin::{BuiltinTools, OsxTool};
pub use loader::ToolLoader;
pub use manifest::{ManifestFactory, ManifestTool, Step, ToolManifest, ENTRY_POINT};

use crate::env::Environment;
use crate::error::Result;
use std::fmt;
use std::path::Path;

/// A loadable extension.
pub trait Tool: fmt::Debug {
    fn name(&self) -> &str;

    /// Self-check run before `generate`. A tool reporting `false` is skipped.
    fn exists(&self) -> bool {
        true
    }

    /// Register the tool's probes and configuration methods.
    fn generate(&self, env: &mut Environment) -> Result<()>;
}

/// Finds tools in a search directory.
pub trait ToolFactory: Send + Sync + fmt::Debug {
    /// The tool `name` provided by `dir`, if any.
    ///
    /// Returns `Ok(None)` when `dir` has no such tool, and an error when it
    /// has one that cannot be read.
    fn locate(&self, name: &str, dir: &Path) -> Result<Option<Box<dyn Tool>>>;
}
