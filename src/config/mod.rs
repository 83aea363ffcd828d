//! Project file loading.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use confprobe::config::{load_project, PROJECT_FILE};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(PROJECT_FILE), "name: widget\nconfigure: [zlib]\n").unwrap();
//!
//! let project = load_project(temp.path(), None).unwrap();
//! assert_eq!(project.name.as_deref(), Some("widget"));
//! assert_eq!(project.configure[0].tool(), "zlib");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{find_project_root, load_project, load_project_file, parse_project, PROJECT_FILE};
pub use schema::{ConfigureEntry, ProjectConfig};
