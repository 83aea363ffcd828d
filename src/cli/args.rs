//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// confprobe - configuration probing for native builds.
#[derive(Debug, Parser)]
#[command(name = "confprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configure the tools listed in the project file
    Configure(ConfigureArgs),

    /// Load a tool and show what it registered
    Locate(LocateArgs),

    /// Check an environment variable
    Env(EnvArgs),

    /// Print the content signature of a file
    Signature(SignatureArgs),

    /// Decide whether a target must be rebuilt because of a dependency
    Decide(DecideArgs),

    /// Download a URL to a file
    Download(DownloadArgs),

    /// Print the JSON schema of tool manifests
    Schema,
}

/// Arguments for `configure`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigureArgs {
    /// Project file to use instead of `confprobe.yml` in the project root
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Extra tool search directory (repeatable)
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_paths: Vec<PathBuf>,

    /// Print the resulting report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `locate`.
#[derive(Debug, Clone, clap::Args)]
pub struct LocateArgs {
    /// Tool name
    pub tool: String,

    /// Extra tool search directory (repeatable)
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_paths: Vec<PathBuf>,
}

/// Arguments for `env`.
#[derive(Debug, Clone, clap::Args)]
pub struct EnvArgs {
    /// Variable name
    pub name: String,

    /// Fail when the variable is unset
    #[arg(long)]
    pub require: bool,
}

/// Arguments for `signature`.
#[derive(Debug, Clone, clap::Args)]
pub struct SignatureArgs {
    pub file: PathBuf,
}

/// Arguments for `decide`.
#[derive(Debug, Clone, clap::Args)]
pub struct DecideArgs {
    /// Dependency file
    pub dep: PathBuf,

    /// Target built from the dependency
    pub target: PathBuf,

    /// Signature recorded for the dependency at the last build
    #[arg(long, value_name = "SIG")]
    pub prev: Option<String>,
}

/// Arguments for `download`.
#[derive(Debug, Clone, clap::Args)]
pub struct DownloadArgs {
    pub url: String,
    pub target: PathBuf,
}
