//! Command-line interface for confprobe.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConfigureArgs, DecideArgs, DownloadArgs, EnvArgs, LocateArgs, SignatureArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
