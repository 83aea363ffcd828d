//! Error types for confprobe operations.
//!
//! This module defines [`ConfprobeError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Optional probes (`check_*`) never produce an error for an absent dependency;
//!   they return [`Probe::Unsatisfied`](crate::probe::Probe::Unsatisfied)
//! - Required probes and required tool configuration surface a domain variant
//!   naming the missing item
//! - Use `anyhow::Error` (via `ConfprobeError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The kind of dependency a required probe was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    EnvVar,
    Library,
    Header,
    CHeader,
    CxxHeader,
    Function,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EnvVar => "environment variable",
            Self::Library => "library",
            Self::Header => "header",
            Self::CHeader => "C header",
            Self::CxxHeader => "C++ header",
            Self::Function => "function",
        };
        f.write_str(label)
    }
}

/// Core error type for confprobe operations.
#[derive(Debug, Error)]
pub enum ConfprobeError {
    /// A required probe was not satisfied.
    #[error("Missing {kind}: {name}")]
    MissingDependency { kind: DependencyKind, name: String },

    /// A named tool could not be loaded from any search path.
    #[error("{}", format_tool_resolution(.name, .searched, .hint.as_deref(), .cause.as_deref()))]
    ToolResolution {
        name: String,
        searched: Vec<PathBuf>,
        hint: Option<String>,
        cause: Option<String>,
    },

    /// No probe is registered under the requested name.
    #[error("Unknown probe: {name}")]
    UnknownProbe { name: String },

    /// A required configuration was requested for a tool that registered no method.
    #[error("Config method not defined for tool {tool}")]
    NoConfigMethod { tool: String },

    /// A required tool's configuration routine reported failure.
    #[error("Failed to configure {tool}")]
    ConfigurationFailed { tool: String },

    /// The options file named by `SCONS_OPTIONS` does not exist.
    #[error("options file \"{}\" set in SCONS_OPTIONS does not exist", .path.display())]
    OptionsFileMissing { path: PathBuf },

    /// A tool manifest could not be parsed.
    #[error("Failed to parse tool manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// No project file was found.
    #[error("Project file not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// The project file or an option file could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    ProjectParse { path: PathBuf, message: String },

    /// A variable value does not match its declared kind.
    #[error("Invalid value for variable '{name}': {message}")]
    InvalidVariable { name: String, message: String },

    /// A build set pattern did not compile.
    #[error("Invalid build set pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Downloading a URL failed.
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_tool_resolution(
    name: &str,
    searched: &[PathBuf],
    hint: Option<&str>,
    cause: Option<&str>,
) -> String {
    let mut msg = format!("Failed to load tool {} from the following paths:", name);
    for path in searched {
        msg.push_str(&format!("\n  {}", path.display()));
    }
    if let Some(cause) = cause {
        msg.push_str(&format!("\nLast error: {}", cause));
    }
    if let Some(hint) = hint {
        msg.push('\n');
        msg.push_str(hint);
    }
    msg
}

/// Result type alias for confprobe operations.
pub type Result<T> = std::result::Result<T, ConfprobeError>;
