//! The build environment and its process-wide registries.
//!
//! An [`Environment`] pairs the mutable settings record ([`BuildEnv`]) with the
//! registries that live for the whole configuration phase: loaded and enabled
//! tools, probe functions, configuration methods, tool search paths, declared
//! variables, header defines and callbacks.
//!
//! Only the settings are snapshotted by a configuration transaction; the
//! registries are shared by every nested transaction.
//!
//! # Example
//!
//! ```
//! use confprobe::env::{keys, Environment, MapVars};
//! use confprobe::probe::Args;
//!
//! let mut env = Environment::new("build").with_vars(MapVars::new());
//! env.add_config_method("threads", |ctx, _args| {
//!     ctx.settings_mut().append_unique(keys::LINKFLAGS, ["-pthread"]);
//!     Ok(true)
//! });
//!
//! assert!(env.run_config("threads", true, &Args::new()).unwrap());
//! assert!(env.is_enabled("threads"));
//! assert_eq!(env.settings().list(keys::LINKFLAGS), ["-pthread"]);
//! ```

pub mod defines;
pub mod settings;
pub mod variables;
pub mod vars;

pub use defines::{render_defines, write_defines};
pub use settings::{keys, BuildEnv, Value};
pub use variables::{apply_variables, help_text, load_option_file, Variable, VariableKind};
pub use vars::{var_prefix, MapVars, SystemVars, VarSource};

use crate::configure;
use crate::error::Result;
use crate::probe::{Args, CcBackend, CompileBackend, ProbeContext, ProbeFn, ProbeOutcome, ProbeRegistry};
use crate::tools::ToolLoader;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A tool's configuration routine.
pub type ConfigMethod = Arc<dyn Fn(&mut ProbeContext<'_>, &Args) -> Result<bool> + Send + Sync>;

/// A configure or finish callback.
pub type Callback = Arc<dyn Fn(&mut Environment) -> Result<()> + Send + Sync>;

/// Default scratch directory for compile probes, relative to the project.
pub const SCRATCH_DIR: &str = ".confprobe";

/// Mutable build configuration plus process-wide registries.
pub struct Environment {
    settings: BuildEnv,
    loaded: BTreeSet<String>,
    enabled: BTreeSet<String>,
    probes: ProbeRegistry,
    methods: HashMap<String, ConfigMethod>,
    search_paths: Vec<PathBuf>,
    variables: Vec<Variable>,
    config_defs: Vec<String>,
    configure_callbacks: Vec<Callback>,
    finish_callbacks: Vec<Callback>,
    messages: Vec<String>,
    vars: Arc<dyn VarSource>,
    backend: Arc<dyn CompileBackend>,
    loader: Arc<ToolLoader>,
}

impl Environment {
    /// Create an environment reading the process variables, probing with the
    /// system C compiler and resolving tools relative to the current directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            settings: BuildEnv::new(name),
            loaded: BTreeSet::new(),
            enabled: BTreeSet::new(),
            probes: ProbeRegistry::with_builtins(),
            methods: HashMap::new(),
            search_paths: Vec::new(),
            variables: Vec::new(),
            config_defs: Vec::new(),
            configure_callbacks: Vec::new(),
            finish_callbacks: Vec::new(),
            messages: Vec::new(),
            vars: Arc::new(SystemVars),
            backend: Arc::new(CcBackend::new(SCRATCH_DIR)),
            loader: Arc::new(ToolLoader::new(".")),
        }
    }

    /// Use a different variable source.
    pub fn with_vars(mut self, vars: impl VarSource + 'static) -> Self {
        self.vars = Arc::new(vars);
        self
    }

    /// Use a different compile backend.
    pub fn with_backend(mut self, backend: Arc<dyn CompileBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Use a different tool loader.
    pub fn with_loader(mut self, loader: ToolLoader) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    // --- Settings ---

    pub fn settings(&self) -> &BuildEnv {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut BuildEnv {
        &mut self.settings
    }

    /// Make `settings` the active record, returning the previous one.
    pub(crate) fn swap_settings(&mut self, settings: BuildEnv) -> BuildEnv {
        std::mem::replace(&mut self.settings, settings)
    }

    /// Look up a variable through the configured source.
    pub fn var(&self, key: &str) -> Option<String> {
        self.vars.var(key)
    }

    pub fn backend(&self) -> Arc<dyn CompileBackend> {
        Arc::clone(&self.backend)
    }

    // --- Variables ---

    pub fn add_variables<I>(&mut self, variables: I)
    where
        I: IntoIterator<Item = Variable>,
    {
        self.variables.extend(variables);
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    // --- Probes and configuration methods ---

    pub fn add_probe<F>(&mut self, name: impl Into<String>, probe: F)
    where
        F: Fn(&mut ProbeContext<'_>, &Args) -> Result<ProbeOutcome> + Send + Sync + 'static,
    {
        self.probes.register(name, probe);
    }

    pub fn probe(&self, name: &str) -> Option<ProbeFn> {
        self.probes.get(name)
    }

    pub fn probes(&self) -> &ProbeRegistry {
        &self.probes
    }

    pub fn add_config_method<F>(&mut self, tool: impl Into<String>, method: F)
    where
        F: Fn(&mut ProbeContext<'_>, &Args) -> Result<bool> + Send + Sync + 'static,
    {
        self.methods.insert(tool.into(), Arc::new(method));
    }

    pub fn config_method(&self, tool: &str) -> Option<ConfigMethod> {
        self.methods.get(tool).cloned()
    }

    pub fn has_config_method(&self, tool: &str) -> bool {
        self.methods.contains_key(tool)
    }

    /// Run a tool's configuration routine as a transaction.
    pub fn run_config(&mut self, tool: &str, required: bool, args: &Args) -> Result<bool> {
        configure::run_config(self, tool, required, args)
    }

    /// A probe context over this environment.
    pub fn context(&mut self) -> ProbeContext<'_> {
        ProbeContext::new(self)
    }

    // --- Tool registries ---

    /// Record a tool as enabled. An enabled tool also counts as loaded.
    pub fn enable_tool(&mut self, name: &str) {
        self.enabled.insert(name.to_string());
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    pub fn enabled_tools(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    pub fn loaded_tools(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }

    pub(crate) fn mark_loaded(&mut self, name: &str) {
        self.loaded.insert(name.to_string());
    }

    pub(crate) fn unmark_loaded(&mut self, name: &str) {
        self.loaded.remove(name);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Add a directory consulted when resolving tools.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub(crate) fn pop_search_path(&mut self) {
        self.search_paths.pop();
    }

    /// Load a tool from the default candidate paths.
    pub fn load_tool(&mut self, name: &str) -> Result<bool> {
        self.load_tool_from(name, &[])
    }

    /// Load a tool, trying `paths` before the default candidates.
    pub fn load_tool_from(&mut self, name: &str, paths: &[PathBuf]) -> Result<bool> {
        let loader = Arc::clone(&self.loader);
        loader.load(self, name, paths)
    }

    /// Load several tools in order.
    pub fn load_tools<S: AsRef<str>>(&mut self, names: &[S], paths: &[PathBuf]) -> Result<()> {
        let loader = Arc::clone(&self.loader);
        loader.load_tools(self, names, paths)
    }

    // --- Defines ---

    /// Append preprocessor defines to `CPPDEFINES`, skipping duplicates.
    pub fn define<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.append_unique(keys::CPPDEFINES, names);
    }

    /// Register defines for the generated header, skipping duplicates.
    pub fn config_def<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.config_defs.contains(&name) {
                self.config_defs.push(name);
            }
        }
    }

    pub fn config_defs(&self) -> &[String] {
        &self.config_defs
    }

    /// Drop header defines registered after the first `len`.
    pub(crate) fn truncate_config_defs(&mut self, len: usize) {
        self.config_defs.truncate(len);
    }

    /// Write the registered header defines to `path`.
    pub fn write_defines(&self, path: &Path) -> Result<()> {
        write_defines(path, &self.config_defs)
    }

    // --- Callbacks ---

    pub fn add_configure_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut Environment) -> Result<()> + Send + Sync + 'static,
    {
        self.configure_callbacks.push(Arc::new(callback));
    }

    pub fn add_finish_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut Environment) -> Result<()> + Send + Sync + 'static,
    {
        self.finish_callbacks.push(Arc::new(callback));
    }

    pub(crate) fn run_configure_callbacks(&mut self) -> Result<()> {
        let callbacks = self.configure_callbacks.clone();
        for callback in callbacks {
            callback(self)?;
        }
        Ok(())
    }

    pub(crate) fn run_finish_callbacks(&mut self) -> Result<()> {
        let callbacks = self.finish_callbacks.clone();
        for callback in callbacks {
            callback(self)?;
        }
        Ok(())
    }

    // --- Status messages ---

    /// Record a one-line, non-fatal status message.
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("settings", &self.settings)
            .field("loaded", &self.loaded)
            .field("enabled", &self.enabled)
            .field("probes", &self.probes)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("search_paths", &self.search_paths)
            .finish_non_exhaustive()
    }
}

/// Compile whitespace-separated patterns into one anchored alternation.
///
/// ```
/// let re = confprobe::env::build_set_regex("lib.* test_.*").unwrap();
/// assert!(re.is_match("libfoo"));
/// assert!(re.is_match("test_bar"));
/// assert!(!re.is_match("xlibfoo"));
/// ```
pub fn build_set_regex(patterns: &str) -> Result<Regex> {
    let alternatives: Vec<String> = patterns
        .split_whitespace()
        .map(|p| format!("({})", p))
        .collect();
    Ok(Regex::new(&format!("^(?:{})$", alternatives.join("|")))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MockBackend;
    use tempfile::TempDir;

    fn test_env() -> Environment {
        Environment::new("test")
            .with_vars(MapVars::new())
            .with_backend(Arc::new(MockBackend::new()))
    }

    #[test]
    fn define_appends_unique() {
        let mut env = test_env();
        env.define(["A", "B"]);
        env.define(["B", "C"]);
        assert_eq!(env.settings().list(keys::CPPDEFINES), ["A", "B", "C"]);
    }

    #[test]
    fn config_defs_keep_registration_order() {
        let mut env = test_env();
        env.config_def(["HAVE_Z"]);
        env.config_def(["HAVE_A", "HAVE_Z"]);
        assert_eq!(env.config_defs(), ["HAVE_Z", "HAVE_A"]);
    }

    #[test]
    fn write_defines_uses_config_defs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("config.h");

        let mut env = test_env();
        env.config_def(["HAVE_ZLIB"]);
        env.write_defines(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("#define HAVE_ZLIB\n"));
    }

    #[test]
    fn enabling_does_not_mark_loaded() {
        let mut env = test_env();
        env.enable_tool("zlib");
        assert!(env.is_enabled("zlib"));
        assert!(!env.is_loaded("zlib"));
    }

    #[test]
    fn builtin_probes_registered() {
        let env = test_env();
        assert!(env.probe("check_env").is_some());
        assert!(env.probe("require_home").is_some());
        assert!(env.probe("config").is_some());
    }

    #[test]
    fn callbacks_run_in_order() {
        let mut env = test_env();
        env.add_configure_callback(|env| {
            env.settings_mut().append(keys::CPPDEFINES, ["FIRST"]);
            Ok(())
        });
        env.add_configure_callback(|env| {
            env.settings_mut().append(keys::CPPDEFINES, ["SECOND"]);
            Ok(())
        });
        env.run_configure_callbacks().unwrap();
        assert_eq!(env.settings().list(keys::CPPDEFINES), ["FIRST", "SECOND"]);
    }

    #[test]
    fn report_collects_messages() {
        let mut env = test_env();
        env.report("zlib: Missing header: zlib.h");
        assert_eq!(env.messages(), ["zlib: Missing header: zlib.h"]);
    }

    #[test]
    fn build_set_regex_anchors_every_alternative() {
        let re = build_set_regex("foo bar.*").unwrap();
        assert!(re.is_match("foo"));
        assert!(re.is_match("barbaz"));
        assert!(!re.is_match("foox"));
        assert!(!re.is_match("xbar"));
    }

    #[test]
    fn build_set_regex_rejects_bad_pattern() {
        assert!(build_set_regex("(").is_err());
    }
}
