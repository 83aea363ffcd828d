//! Configure command implementation.
//!
//! `confprobe configure` loads the project file, configures every listed tool
//! and writes the defines header.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigureArgs;
use crate::config::load_project;
use crate::configure::{configure_project, ProjectReport};
use crate::error::{ConfprobeError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project_environment;

/// The configure command implementation.
pub struct ConfigureCommand {
    project_root: PathBuf,
    args: ConfigureArgs,
}

impl ConfigureCommand {
    pub fn new(project_root: &Path, args: ConfigureArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    pub fn args(&self) -> &ConfigureArgs {
        &self.args
    }

    fn show_report(&self, report: &ProjectReport, ui: &mut dyn UserInterface) {
        ui.show_header(&format!("Configured {}", report.name));
        for tool in &report.configured {
            ui.success(tool);
        }
        for tool in &report.skipped {
            ui.warning(&format!("{} (skipped)", tool));
        }

        if ui.output_mode().shows_detail() {
            for path in &report.option_files {
                ui.show_key_value("options", &path.display().to_string());
            }
            for key in report.settings.keys() {
                let value = report
                    .settings
                    .get(key)
                    .map(|v| v.as_list().join(" "))
                    .unwrap_or_default();
                ui.show_key_value(key, &value);
            }
        }

        if let Some(header) = &report.config_header {
            ui.message(&format!("Wrote {}", header.display()));
        }
    }
}

impl Command for ConfigureCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = load_project(&self.project_root, self.args.file.as_deref())?;
        let name = project.display_name(&self.project_root);

        let mut env = project_environment(&name, &self.project_root);
        let report = configure_project(&mut env, &project, &self.project_root, &self.args.tool_paths)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| ConfprobeError::Other(e.into()))?;
            ui.output(&json);
        } else {
            self.show_report(&report, ui);
        }

        Ok(CommandResult::success())
    }
}
