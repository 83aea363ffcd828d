//! The configure phase.
//!
//! A [`ConfigureSession`] brackets one configuration run: it installs the
//! rebuild decider, applies option files to the declared variables and runs
//! the configure callbacks on entry, then runs the finish callbacks and hands
//! the decider to the build phase on exit.

use crate::decider::ContentSignatureDecider;
use crate::env::{apply_variables, help_text, load_option_file, Environment};
use crate::error::{ConfprobeError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Variable naming an extra options file, consulted first.
pub const OPTIONS_VAR: &str = "SCONS_OPTIONS";

/// Project-level option files, in increasing precedence.
pub const OPTION_FILES: [&str; 2] = ["default-options.yml", "options.yml"];

/// State carried from configure to build.
#[derive(Debug)]
pub struct ConfigureSession {
    project_dir: PathBuf,
    option_files: Vec<PathBuf>,
    help: String,
    decider: ContentSignatureDecider,
}

impl ConfigureSession {
    /// Start configuring the project at `project_dir`.
    pub fn begin(env: &mut Environment, project_dir: &Path) -> Result<Self> {
        let decider = ContentSignatureDecider::new();
        let option_files = collect_option_files(env, project_dir)?;

        let mut option_sets: Vec<BTreeMap<String, String>> = Vec::new();
        for path in &option_files {
            tracing::debug!("Reading options from {}", path.display());
            option_sets.push(load_option_file(path)?);
        }

        let variables = env.variables().to_vec();
        apply_variables(env.settings_mut(), &variables, &option_sets)?;
        let help = help_text(&variables, env.settings());

        env.run_configure_callbacks()?;

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            option_files,
            help,
            decider,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Option files that were applied, lowest precedence first.
    pub fn option_files(&self) -> &[PathBuf] {
        &self.option_files
    }

    /// Help text for the declared variables.
    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn decider(&mut self) -> &mut ContentSignatureDecider {
        &mut self.decider
    }

    /// End the configure phase, returning the decider for the build phase.
    pub fn finish(self, env: &mut Environment) -> Result<ContentSignatureDecider> {
        env.run_finish_callbacks()?;
        Ok(self.decider)
    }
}

fn collect_option_files(env: &Environment, project_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if let Some(named) = env.var(OPTIONS_VAR) {
        let path = PathBuf::from(named);
        if !path.is_file() {
            return Err(ConfprobeError::OptionsFileMissing { path });
        }
        files.push(path);
    }

    for name in OPTION_FILES {
        let path = project_dir.join(name);
        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}
