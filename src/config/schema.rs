//! Project file schema.
//!
//! This module contains the struct definitions that map to `confprobe.yml`.

use crate::env::Variable;
use crate::probe::Args;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root structure of `confprobe.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used as the settings record name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Extra tool search directories, relative to the project root
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_paths: Vec<PathBuf>,

    /// Tools loaded before configuration starts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Declared configuration variables
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    /// Tools to configure, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configure: Vec<ConfigureEntry>,

    /// Preprocessor defines added to every build
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,

    /// Defines written to the generated header
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_defs: Vec<String>,

    /// Where to write the generated header, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_header: Option<PathBuf>,
}

impl ProjectConfig {
    /// Project name, falling back to the root directory's name.
    pub fn display_name(&self, root: &Path) -> String {
        self.name.clone().unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        })
    }

    /// Tool search directories resolved against `root`.
    pub fn resolved_tool_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.tool_paths.iter().map(|p| root.join(p)).collect()
    }
}

/// One tool to configure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConfigureEntry {
    /// Bare tool name, configured as required
    Tool(String),
    Detailed {
        tool: String,
        #[serde(default = "default_true")]
        required: bool,
        #[serde(default)]
        args: Args,
    },
}

impl ConfigureEntry {
    pub fn tool(&self) -> &str {
        match self {
            ConfigureEntry::Tool(tool) | ConfigureEntry::Detailed { tool, .. } => tool,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            ConfigureEntry::Tool(_) => true,
            ConfigureEntry::Detailed { required, .. } => *required,
        }
    }

    pub fn args(&self) -> Args {
        match self {
            ConfigureEntry::Tool(_) => Args::new(),
            ConfigureEntry::Detailed { args, .. } => args.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}
