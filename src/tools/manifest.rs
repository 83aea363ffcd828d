//! Declarative tools.
//!
//! A tool directory holds a `tool.yml` manifest listing the sub-tools it
//! loads, the header defines it contributes and the steps of its
//! configuration routine:
//!
//! ```yaml
//! name: demo
//! description: Demo library
//! tools: [sub]
//! defines: [HAVE_DEMO]
//! configure:
//!   - require_home: demo
//!   - check_lib: demo
//!   - config: { tool: sub, required: false }
//! ```
//!
//! A manifest without a `configure` key registers no configuration method.

use crate::env::Environment;
use crate::error::{ConfprobeError, Result};
use crate::probe::{Args, HomeOptions, Lang, LibOptions, Probe, ProbeContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Tool, ToolFactory};

/// File name of a tool's manifest inside its directory.
pub const ENTRY_POINT: &str = "tool.yml";

/// A parsed `tool.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolManifest {
    /// Tool name. Must match the directory the manifest lives in.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tools loaded when this tool is loaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Header defines registered when configuration succeeds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,

    /// Steps of the configuration routine, run in order.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    #[schemars(with = "Option<Vec<Step>>")]
    pub configure: Option<Vec<Step>>,
}

impl ToolManifest {
    /// Parse manifest text read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfprobeError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }
}

/// One step of a declarative configuration routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CheckEnv(EnvSpec),
    RequireEnv(EnvSpec),
    CheckHome(HomeSpec),
    RequireHome(HomeSpec),
    CheckLib(LibSpec),
    RequireLib(LibSpec),
    CheckHeader(SymbolSpec),
    RequireHeader(SymbolSpec),
    CheckCHeader(String),
    RequireCHeader(String),
    CheckCxxHeader(String),
    RequireCxxHeader(String),
    CheckFunc(SymbolSpec),
    RequireFunc(SymbolSpec),
    /// Configure another tool as a nested transaction.
    Config(ConfigStep),
    /// Append preprocessor defines.
    Define(Vec<String>),
    /// Register header defines.
    ConfigDef(Vec<String>),
    Append(EditStep),
    Prepend(EditStep),
    /// Run a registered probe by name.
    Probe(ProbeStep),
}

/// A variable lookup. `into` names a setting that receives the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EnvSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        into: Option<String>,
    },
}

impl EnvSpec {
    pub fn name(&self) -> &str {
        match self {
            EnvSpec::Name(name) | EnvSpec::Detailed { name, .. } => name,
        }
    }

    pub fn into_key(&self) -> Option<&str> {
        match self {
            EnvSpec::Name(_) => None,
            EnvSpec::Detailed { into, .. } => into.as_deref(),
        }
    }
}

/// A home lookup: a bare name or a name with suffix overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HomeSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        inc_suffix: Option<Vec<String>>,
        #[serde(default)]
        lib_suffix: Option<Vec<String>>,
        /// Suffix of the home variable, `_HOME` by default.
        #[serde(default)]
        suffix: Option<String>,
    },
}

impl HomeSpec {
    pub fn name(&self) -> &str {
        match self {
            HomeSpec::Name(name) | HomeSpec::Detailed { name, .. } => name,
        }
    }

    pub fn options(&self) -> HomeOptions {
        let mut opts = HomeOptions::default();
        if let HomeSpec::Detailed {
            inc_suffix,
            lib_suffix,
            suffix,
            ..
        } = self
        {
            if let Some(inc) = inc_suffix {
                opts.inc_suffixes = inc.clone();
            }
            if let Some(lib) = lib_suffix {
                opts.lib_suffixes = lib.clone();
            }
            if let Some(suffix) = suffix {
                opts.var_suffix = suffix.clone();
            }
        }
        opts
    }
}

/// A library lookup: a bare name or a name with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LibSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        unique: bool,
        #[serde(default)]
        lang: Lang,
    },
}

impl LibSpec {
    pub fn name(&self) -> &str {
        match self {
            LibSpec::Name(name) | LibSpec::Detailed { name, .. } => name,
        }
    }

    pub fn options(&self) -> LibOptions {
        match self {
            LibSpec::Name(_) => LibOptions::default(),
            LibSpec::Detailed { unique, lang, .. } => LibOptions {
                unique: *unique,
                lang: *lang,
            },
        }
    }
}

/// A header or function name, optionally with a language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SymbolSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        lang: Lang,
    },
}

impl SymbolSpec {
    pub fn name(&self) -> &str {
        match self {
            SymbolSpec::Name(name) | SymbolSpec::Detailed { name, .. } => name,
        }
    }

    pub fn lang(&self) -> Lang {
        match self {
            SymbolSpec::Name(_) => Lang::C,
            SymbolSpec::Detailed { lang, .. } => *lang,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigStep {
    pub tool: String,

    #[serde(default = "default_true")]
    pub required: bool,

    #[serde(default)]
    pub args: Args,
}

/// Append or prepend values to a setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditStep {
    pub key: String,
    pub values: Vec<String>,

    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProbeStep {
    pub name: String,

    #[serde(default)]
    pub args: Args,

    /// Fail the routine when the probe is unsatisfied.
    #[serde(default)]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

/// Run one step. Returns `Ok(false)` when the routine should report failure.
fn run_step(ctx: &mut ProbeContext<'_>, step: &Step) -> Result<bool> {
    match step {
        Step::CheckEnv(spec) => {
            if let Probe::Satisfied(value) = ctx.check_env(spec.name()) {
                if let Some(key) = spec.into_key() {
                    ctx.settings_mut().set_text(key, value);
                }
            }
        }
        Step::RequireEnv(spec) => {
            let value = ctx.require_env(spec.name())?;
            if let Some(key) = spec.into_key() {
                ctx.settings_mut().set_text(key, value);
            }
        }
        Step::CheckHome(spec) => {
            ctx.check_home(spec.name(), &spec.options(), false)?;
        }
        Step::RequireHome(spec) => {
            ctx.require_home(spec.name(), &spec.options())?;
        }
        Step::CheckLib(spec) => {
            ctx.check_lib(spec.name(), spec.options())?;
        }
        Step::RequireLib(spec) => {
            ctx.require_lib(spec.name(), spec.options())?;
        }
        Step::CheckHeader(spec) => {
            ctx.check_header(spec.name(), spec.lang())?;
        }
        Step::RequireHeader(spec) => ctx.require_header(spec.name(), spec.lang())?,
        Step::CheckCHeader(header) => {
            ctx.check_c_header(header)?;
        }
        Step::RequireCHeader(header) => ctx.require_c_header(header)?,
        Step::CheckCxxHeader(header) => {
            ctx.check_cxx_header(header)?;
        }
        Step::RequireCxxHeader(header) => ctx.require_cxx_header(header)?,
        Step::CheckFunc(spec) => {
            ctx.check_func(spec.name(), spec.lang())?;
        }
        Step::RequireFunc(spec) => ctx.require_func(spec.name(), spec.lang())?,
        Step::Config(config) => {
            let ok = ctx.config(&config.tool, config.required, &config.args)?;
            if !ok && config.required {
                return Ok(false);
            }
        }
        Step::Define(names) => ctx.env_mut().define(names.iter().cloned()),
        Step::ConfigDef(names) => ctx.env_mut().config_def(names.iter().cloned()),
        Step::Append(edit) => {
            if edit.unique {
                ctx.settings_mut().append_unique(&edit.key, edit.values.iter().cloned());
            } else {
                ctx.settings_mut().append(&edit.key, edit.values.iter().cloned());
            }
        }
        Step::Prepend(edit) => {
            if edit.unique {
                ctx.settings_mut().prepend_unique(&edit.key, edit.values.iter().cloned());
            } else {
                ctx.settings_mut().prepend(&edit.key, edit.values.iter().cloned());
            }
        }
        Step::Probe(probe) => {
            let outcome = ctx.run_probe(&probe.name, &probe.args)?;
            if probe.required && !outcome.is_satisfied() {
                tracing::debug!("Probe {} unsatisfied", probe.name);
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Run a sequence of steps, stopping at the first failure.
pub fn run_steps(ctx: &mut ProbeContext<'_>, steps: &[Step]) -> Result<bool> {
    for step in steps {
        if !run_step(ctx, step)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// A tool backed by a manifest.
#[derive(Debug, Clone)]
pub struct ManifestTool {
    manifest: Arc<ToolManifest>,
    source: Option<PathBuf>,
}

impl ManifestTool {
    pub fn new(manifest: ToolManifest) -> Self {
        Self {
            manifest: Arc::new(manifest),
            source: None,
        }
    }

    /// Record where the manifest was read from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl Tool for ManifestTool {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn generate(&self, env: &mut Environment) -> Result<()> {
        env.load_tools(&self.manifest.tools, &[])?;

        if self.manifest.configure.is_some() {
            let manifest = Arc::clone(&self.manifest);
            env.add_config_method(self.manifest.name.clone(), move |ctx, args| {
                for (key, value) in &args.options {
                    ctx.settings_mut().set_text(key.clone(), value.clone());
                }
                let steps = manifest.configure.as_deref().unwrap_or_default();
                if !run_steps(ctx, steps)? {
                    return Ok(false);
                }
                ctx.env_mut().config_def(manifest.defines.iter().cloned());
                Ok(true)
            });
        }

        Ok(())
    }
}

/// Reads `<dir>/<name>/tool.yml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestFactory;

impl ToolFactory for ManifestFactory {
    fn locate(&self, name: &str, dir: &Path) -> Result<Option<Box<dyn Tool>>> {
        let path = dir.join(name).join(ENTRY_POINT);
        if !path.is_file() {
            return Ok(None);
        }

        let manifest = ToolManifest::from_file(&path)?;
        if manifest.name != name {
            return Err(ConfprobeError::ManifestParse {
                path,
                message: format!("manifest declares tool '{}'", manifest.name),
            });
        }

        tracing::debug!("Found tool {} at {}", name, path.display());
        Ok(Some(Box::new(ManifestTool::new(manifest).with_source(path))))
    }
}
