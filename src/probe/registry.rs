//! Named probe functions.
//!
//! Tool manifests and configuration routines refer to probes by name. The
//! registry maps each name to a function taking a [`ProbeContext`] and
//! [`Args`]. [`ProbeRegistry::with_builtins`] registers the standard probes;
//! tools add their own (the `osx` tool adds `check_osx_framework`) through
//! [`Environment::add_probe`](crate::env::Environment::add_probe).
//!
//! Registering a name that already exists replaces the previous probe.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::args::Args;
use super::backend::Lang;
use super::context::{HomeOptions, LibOptions, ProbeContext};
use super::{Probe, ProbeOutcome, ProbeValue};

/// A registered probe.
pub type ProbeFn = Arc<dyn Fn(&mut ProbeContext<'_>, &Args) -> Result<ProbeOutcome> + Send + Sync>;

/// Probe functions by name.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: BTreeMap<String, ProbeFn>,
}

impl ProbeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every standard probe.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("check_env", |ctx, args| {
            let name = args.expect_arg(0, "check_env")?;
            Ok(ctx.check_env(name).into())
        });
        registry.register("require_env", |ctx, args| {
            let name = args.expect_arg(0, "require_env")?;
            Ok(Probe::Satisfied(ProbeValue::Text(ctx.require_env(name)?)))
        });
        registry.register("check_env_path", |ctx, args| {
            let name = args.expect_arg(0, "check_env_path")?;
            Ok(ctx.check_env_path(name).into())
        });
        registry.register("check_path_with_suffix", |ctx, args| {
            let base = args.expect_arg(0, "check_path_with_suffix")?;
            Ok(ctx.check_path_with_suffixes(base, args.rest(1)).into())
        });

        registry.register("check_home", |ctx, args| {
            let name = args.expect_arg(0, "check_home")?;
            let home = ctx.check_home(name, &home_options(args), args.flag("required"))?;
            Ok(home.map(ProbeValue::Text).into())
        });
        registry.register("require_home", |ctx, args| {
            let name = args.expect_arg(0, "require_home")?;
            let home = ctx.require_home(name, &home_options(args))?;
            Ok(Probe::Satisfied(
                home.map_or(ProbeValue::Found, ProbeValue::Text),
            ))
        });

        registry.register("check_lib", |ctx, args| {
            let lib = args.expect_arg(0, "check_lib")?;
            Ok(ctx.check_lib(lib, lib_options(args)?)?.into())
        });
        registry.register("require_lib", |ctx, args| {
            let lib = args.expect_arg(0, "require_lib")?;
            Ok(Probe::Satisfied(ProbeValue::Text(
                ctx.require_lib(lib, lib_options(args)?)?,
            )))
        });

        registry.register("check_header", |ctx, args| {
            let header = args.expect_arg(0, "check_header")?;
            Ok(ctx.check_header(header, lang(args)?)?.into())
        });
        registry.register("require_header", |ctx, args| {
            let header = args.expect_arg(0, "require_header")?;
            ctx.require_header(header, lang(args)?)?;
            Ok(Probe::Satisfied(ProbeValue::Found))
        });
        registry.register("check_c_header", |ctx, args| {
            let header = args.expect_arg(0, "check_c_header")?;
            Ok(ctx.check_c_header(header)?.into())
        });
        registry.register("require_c_header", |ctx, args| {
            let header = args.expect_arg(0, "require_c_header")?;
            ctx.require_c_header(header)?;
            Ok(Probe::Satisfied(ProbeValue::Found))
        });
        registry.register("check_cxx_header", |ctx, args| {
            let header = args.expect_arg(0, "check_cxx_header")?;
            Ok(ctx.check_cxx_header(header)?.into())
        });
        registry.register("require_cxx_header", |ctx, args| {
            let header = args.expect_arg(0, "require_cxx_header")?;
            ctx.require_cxx_header(header)?;
            Ok(Probe::Satisfied(ProbeValue::Found))
        });

        registry.register("check_func", |ctx, args| {
            let func = args.expect_arg(0, "check_func")?;
            Ok(ctx.check_func(func, lang(args)?)?.into())
        });
        registry.register("require_func", |ctx, args| {
            let func = args.expect_arg(0, "require_func")?;
            ctx.require_func(func, lang(args)?)?;
            Ok(Probe::Satisfied(ProbeValue::Found))
        });

        registry.register("config", |ctx, args| {
            let tool = args.expect_arg(0, "config")?;
            let required = args.flag_or("required", true);
            let forwarded = Args {
                positional: args.rest(1).to_vec(),
                options: args.without("required").options,
            };
            Ok(Probe::from(ctx.config(tool, required, &forwarded)?).into())
        });

        registry
    }

    /// Register (or replace) a probe.
    pub fn register<F>(&mut self, name: impl Into<String>, probe: F)
    where
        F: Fn(&mut ProbeContext<'_>, &Args) -> Result<ProbeOutcome> + Send + Sync + 'static,
    {
        self.probes.insert(name.into(), Arc::new(probe));
    }

    pub fn get(&self, name: &str) -> Option<ProbeFn> {
        self.probes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.probes.keys()).finish()
    }
}

fn home_options(args: &Args) -> HomeOptions {
    let mut opts = HomeOptions::default();
    if let Some(inc) = args.list("inc_suffix") {
        opts.inc_suffixes = inc;
    }
    if let Some(lib) = args.list("lib_suffix") {
        opts.lib_suffixes = lib;
    }
    if let Some(suffix) = args.get("suffix") {
        opts.var_suffix = suffix.to_string();
    }
    opts
}

fn lang(args: &Args) -> Result<Lang> {
    match args.get("lang") {
        None => Ok(Lang::C),
        Some(name) => Lang::parse(name).ok_or_else(|| {
            anyhow::anyhow!("unknown language '{}', expected c or c++", name).into()
        }),
    }
}

fn lib_options(args: &Args) -> Result<LibOptions> {
    Ok(LibOptions {
        unique: args.flag("unique"),
        lang: lang(args)?,
    })
}
