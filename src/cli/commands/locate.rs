//! Locate command implementation.
//!
//! `confprobe locate <tool>` loads one tool and shows what it registered.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::LocateArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project_environment;

/// The locate command implementation.
pub struct LocateCommand {
    project_root: PathBuf,
    args: LocateArgs,
}

impl LocateCommand {
    pub fn new(project_root: &Path, args: LocateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for LocateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut env = project_environment(&self.args.tool, &self.project_root);
        let before: BTreeSet<String> = env.probes().names().map(str::to_string).collect();

        env.load_tool_from(&self.args.tool, &self.args.tool_paths)?;

        ui.success(&format!("Loaded {}", self.args.tool));

        let loaded: Vec<&str> = env.loaded_tools().collect();
        ui.show_key_value("tools", &loaded.join(" "));

        let probes: Vec<&str> = env
            .probes()
            .names()
            .filter(|name| !before.contains(*name))
            .collect();
        if !probes.is_empty() {
            ui.show_key_value("probes", &probes.join(" "));
        }

        let methods: Vec<&str> = loaded
            .iter()
            .copied()
            .filter(|tool| env.has_config_method(tool))
            .collect();
        ui.show_key_value("config methods", &methods.join(" "));

        Ok(CommandResult::success())
    }
}
