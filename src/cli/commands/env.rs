//! Env command implementation.

use crate::cli::args::EnvArgs;
use crate::env::{Environment, MapVars};
use crate::error::Result;
use crate::probe::Probe;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The env command implementation.
pub struct EnvCommand {
    args: EnvArgs,
    vars: Option<MapVars>,
}

impl EnvCommand {
    pub fn new(args: EnvArgs) -> Self {
        Self { args, vars: None }
    }

    /// Read variables from `vars` instead of the process environment.
    pub fn with_vars(args: EnvArgs, vars: MapVars) -> Self {
        Self {
            args,
            vars: Some(vars),
        }
    }

    fn environment(&self) -> Environment {
        match &self.vars {
            Some(vars) => Environment::new("env").with_vars(vars.clone()),
            None => Environment::new("env"),
        }
    }
}

impl Command for EnvCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut env = self.environment();
        let mut ctx = env.context();

        if self.args.require {
            let value = ctx.require_env(&self.args.name)?;
            ui.output(&value);
            return Ok(CommandResult::success());
        }

        match ctx.check_env(&self.args.name) {
            Probe::Satisfied(value) => {
                ui.output(&value);
                Ok(CommandResult::success())
            }
            Probe::Unsatisfied => {
                ui.warning(&format!("{} is not set", self.args.name));
                Ok(CommandResult::failure(1))
            }
        }
    }
}
