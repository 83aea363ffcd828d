//! confprobe - configuration probing for native builds.
//!
//! confprobe discovers where third-party libraries, headers and environment
//! settings live, records them in a build environment, and writes a defines
//! header for the compiler.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - The `confprobe.yml` project file
//! - [`configure`] - Configuration transactions and the configure phase
//! - [`decider`] - Content-signature rebuild decisions
//! - [`env`] - The build environment, variables and defines
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - URL downloads
//! - [`probe`] - Probes and the probe context
//! - [`tools`] - Tool loading and declarative tool manifests
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use confprobe::env::{keys, Environment, MapVars};
//! use confprobe::probe::{Args, MockBackend};
//! use std::sync::Arc;
//!
//! let home = tempfile::tempdir().unwrap();
//! std::fs::create_dir(home.path().join("include")).unwrap();
//! let home = home.path().display().to_string();
//!
//! let mut env = Environment::new("build")
//!     .with_vars(MapVars::new().with("ZLIB_HOME", home.as_str()))
//!     .with_backend(Arc::new(MockBackend::new().with_header("zlib.h").with_lib("z")));
//!
//! env.load_tool("zlib").unwrap();
//! assert!(env.run_config("zlib", true, &Args::new()).unwrap());
//! assert_eq!(env.settings().list(keys::CPPPATH), [format!("{}/include", home)]);
//! assert_eq!(env.settings().list(keys::LIBS), ["z"]);
//! ```

pub mod cli;
pub mod config;
pub mod configure;
pub mod decider;
pub mod env;
pub mod error;
pub mod fetch;
pub mod probe;
pub mod tools;
pub mod ui;

pub use error::{ConfprobeError, Result};
