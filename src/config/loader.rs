//! Project file discovery and loading.

use crate::config::schema::ProjectConfig;
use crate::error::{ConfprobeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project file.
pub const PROJECT_FILE: &str = "confprobe.yml";

/// Find the project root by walking up from `start`.
///
/// The root is the nearest directory containing `confprobe.yml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(PROJECT_FILE).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load and parse a project file.
///
/// # Errors
///
/// Returns `ProjectNotFound` if the file doesn't exist.
/// Returns `ProjectParse` if the YAML is invalid.
pub fn load_project_file(path: &Path) -> Result<ProjectConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfprobeError::ProjectNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfprobeError::Io(e)
        }
    })?;

    parse_project(&content, path)
}

/// Parse YAML content into a [`ProjectConfig`].
///
/// An empty document yields the default configuration.
pub fn parse_project(content: &str, source_path: &Path) -> Result<ProjectConfig> {
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| ConfprobeError::ProjectParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the project for `root`, or the explicit `file` when given.
pub fn load_project(root: &Path, file: Option<&Path>) -> Result<ProjectConfig> {
    match file {
        Some(path) => load_project_file(path),
        None => load_project_file(&root.join(PROJECT_FILE)),
    }
}
