//! Tool resolution from search paths.

use crate::env::{var_prefix, Environment};
use crate::error::{ConfprobeError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::builtin::BuiltinTools;
use super::manifest::ManifestFactory;
use super::{Tool, ToolFactory};

/// Finds and loads tools, each at most once per environment.
pub struct ToolLoader {
    project_dir: PathBuf,
    engine_dir: Option<PathBuf>,
    factories: Vec<Box<dyn ToolFactory>>,
    builtins: Option<BuiltinTools>,
}

impl ToolLoader {
    /// A loader reading manifests, with built-in tools as the last resort.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            engine_dir: engine_dir(),
            factories: vec![Box::new(ManifestFactory)],
            builtins: Some(BuiltinTools),
        }
    }

    /// A loader with no factories, no built-ins and no engine directory.
    pub fn empty(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            engine_dir: None,
            factories: Vec::new(),
            builtins: None,
        }
    }

    /// Add a factory, consulted after the existing ones for each path.
    pub fn with_factory(mut self, factory: impl ToolFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Override the install directory searched after `$<NAME>_HOME/config`.
    pub fn with_engine_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.engine_dir = dir;
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.builtins = None;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Directories searched for `name`, highest priority first.
    pub fn candidate_paths(
        &self,
        env: &Environment,
        name: &str,
        explicit: &[PathBuf],
    ) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = explicit.to_vec();
        paths.extend(env.search_paths().iter().cloned());

        if let Some(home) = env.var(&home_var(name)) {
            paths.push(Path::new(&home).join("config"));
        }

        if let Some(engine) = &self.engine_dir {
            paths.push(engine.clone());
        }

        paths.push(self.project_dir.join("config"));
        paths
    }

    /// Load `name` unless it is already loaded.
    ///
    /// Each candidate directory is offered to every factory in turn; the
    /// first tool found that loads without error wins. A tool that fails to
    /// load is logged and the search continues. When nothing loads the error
    /// lists every directory tried.
    pub fn load(&self, env: &mut Environment, name: &str, explicit: &[PathBuf]) -> Result<bool> {
        if env.is_loaded(name) {
            tracing::debug!("Tool {} already loaded", name);
            return Ok(true);
        }

        let candidates = self.candidate_paths(env, name, explicit);
        let mut last_error = None;

        for dir in &candidates {
            for factory in &self.factories {
                let tool = match factory.locate(name, dir) {
                    Ok(Some(tool)) => tool,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!("Skipping tool {} in {}: {}", name, dir.display(), e);
                        last_error = Some(e.to_string());
                        continue;
                    }
                };

                match self.install(env, name, tool.as_ref(), Some(dir)) {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("Failed to load tool {} from {}: {}", name, dir.display(), e);
                        last_error = Some(e.to_string());
                    }
                }
            }
        }

        if let Some(builtins) = &self.builtins {
            if let Some(tool) = builtins.get(name)? {
                match self.install(env, name, tool.as_ref(), None) {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("Failed to load built-in tool {}: {}", name, e);
                        last_error = Some(e.to_string());
                    }
                }
            }
        }

        let home_var = home_var(name);
        let hint = env
            .var(&home_var)
            .is_none()
            .then(|| format!("Have you set {}?", home_var));

        Err(ConfprobeError::ToolResolution {
            name: name.to_string(),
            searched: candidates,
            hint,
            cause: last_error,
        })
    }

    /// Load several tools in order. Each entry may hold several
    /// whitespace-separated names.
    pub fn load_tools<S: AsRef<str>>(
        &self,
        env: &mut Environment,
        names: &[S],
        explicit: &[PathBuf],
    ) -> Result<()> {
        for entry in names {
            for name in entry.as_ref().split_whitespace() {
                self.load(env, name, explicit)?;
            }
        }
        Ok(())
    }

    fn install(
        &self,
        env: &mut Environment,
        name: &str,
        tool: &dyn Tool,
        dir: Option<&Path>,
    ) -> Result<bool> {
        env.mark_loaded(name);
        if let Some(dir) = dir {
            env.add_search_path(dir);
        }

        let result = if tool.exists() {
            tool.generate(env).map(|()| true)
        } else {
            tracing::debug!("Tool {} reports it does not exist", name);
            Ok(false)
        };

        if dir.is_some() {
            env.pop_search_path();
        }

        match result {
            Ok(true) => {
                tracing::debug!("Loaded tool {}", name);
                Ok(true)
            }
            other => {
                env.unmark_loaded(name);
                other
            }
        }
    }
}

impl fmt::Debug for ToolLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolLoader")
            .field("project_dir", &self.project_dir)
            .field("engine_dir", &self.engine_dir)
            .field("factories", &self.factories)
            .field("builtins", &self.builtins.is_some())
            .finish()
    }
}

fn home_var(name: &str) -> String {
    format!("{}_HOME", var_prefix(name))
}

/// Directory holding the running executable.
fn engine_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}
