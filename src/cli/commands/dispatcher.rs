//! Command dispatching.

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Configure(args) => {
                let cmd = super::configure::ConfigureCommand::new(&self.project_root, args.clone());
                cmd.execute(ui)
            }
            Commands::Locate(args) => {
                let cmd = super::locate::LocateCommand::new(&self.project_root, args.clone());
                cmd.execute(ui)
            }
            Commands::Env(args) => {
                let cmd = super::env::EnvCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Signature(args) => {
                let cmd = super::signature::SignatureCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Decide(args) => {
                let cmd = super::decide::DecideCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Download(args) => {
                let cmd = super::download::DownloadCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Schema => super::schema::SchemaCommand.execute(ui),
        }
    }
}
