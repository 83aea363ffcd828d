//! The context probes run in.
//!
//! A [`ProbeContext`] borrows the [`Environment`] for the duration of a probe
//! or configuration routine. Inside a transaction the environment's active
//! settings are the transaction's scratch copy, so everything recorded here
//! lands in the scratch copy and is only kept if the routine succeeds.
//!
//! Each `check_*` method returns a [`Probe`] and never fails for an absent
//! dependency. Each `require_*` method calls its `check_*` counterpart and
//! turns [`Probe::Unsatisfied`] into [`ConfprobeError::MissingDependency`].

use crate::configure;
use crate::env::{keys, var_prefix, BuildEnv, Environment};
use crate::error::{ConfprobeError, DependencyKind, Result};
use std::borrow::Cow;
use std::path::PathBuf;

use super::args::Args;
use super::backend::Lang;
use super::{Probe, ProbeOutcome};

/// Suffixes used by [`ProbeContext::check_home`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeOptions {
    /// Appended to the home path to find include directories.
    pub inc_suffixes: Vec<String>,
    /// Appended to the home path to find library directories.
    pub lib_suffixes: Vec<String>,
    /// Suffix of the home variable itself.
    pub var_suffix: String,
}

impl Default for HomeOptions {
    fn default() -> Self {
        Self {
            inc_suffixes: vec!["/include".to_string()],
            lib_suffixes: vec!["/lib".to_string()],
            var_suffix: "_HOME".to_string(),
        }
    }
}

/// Options for [`ProbeContext::check_lib`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibOptions {
    /// Skip prepending the library when it is already listed.
    pub unique: bool,
    pub lang: Lang,
}

/// Borrowed environment plus per-invocation reporting state.
pub struct ProbeContext<'a> {
    env: &'a mut Environment,
    did_show_result: bool,
}

impl<'a> ProbeContext<'a> {
    pub fn new(env: &'a mut Environment) -> Self {
        Self {
            env,
            did_show_result: false,
        }
    }

    pub fn env(&self) -> &Environment {
        &*self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut *self.env
    }

    /// The active settings (the scratch copy inside a transaction).
    pub fn settings(&self) -> &BuildEnv {
        self.env.settings()
    }

    pub fn settings_mut(&mut self) -> &mut BuildEnv {
        self.env.settings_mut()
    }

    /// Settings handed to the compile backend. `CC` and `CXX` come from the
    /// variable source when the settings leave them unset.
    pub fn backend_settings(&self) -> Cow<'_, BuildEnv> {
        let missing: Vec<(&str, String)> = [keys::CC, keys::CXX]
            .into_iter()
            .filter(|key| self.settings().get(key).is_none())
            .filter_map(|key| self.env.var(key).map(|value| (key, value)))
            .collect();
        if missing.is_empty() {
            return Cow::Borrowed(self.settings());
        }

        let mut settings = self.settings().clone();
        for (key, value) in missing {
            settings.set_text(key, value);
        }
        Cow::Owned(settings)
    }

    /// Whether any probe in this context has produced a visible result.
    pub fn did_show_result(&self) -> bool {
        self.did_show_result
    }

    fn shown(&mut self) {
        self.did_show_result = true;
    }

    /// Announce a check.
    pub fn message(&mut self, text: &str) {
        tracing::info!("{}", text);
    }

    /// Report a check's result.
    pub fn result(&mut self, ok: bool) {
        self.shown();
        tracing::info!("{}", if ok { "yes" } else { "no" });
    }

    // --- Environment variables ---

    /// Check whether a variable is set.
    pub fn check_env(&mut self, name: &str) -> Probe<String> {
        self.shown();
        self.env.var(name).into()
    }

    /// Check a variable, failing when it is unset and `required` is true.
    pub fn check_env_var(&mut self, name: &str, required: bool) -> Result<Option<String>> {
        let probe = self.check_env(name);
        if required {
            probe.require(DependencyKind::EnvVar, name).map(Some)
        } else {
            Ok(probe.into_option())
        }
    }

    pub fn require_env(&mut self, name: &str) -> Result<String> {
        self.check_env(name).require(DependencyKind::EnvVar, name)
    }

    /// Directories from a `;`-separated path-list variable that exist on disk,
    /// in order.
    pub fn check_env_path(&mut self, name: &str) -> Vec<PathBuf> {
        self.shown();
        let Some(value) = self.env.var(name) else {
            return Vec::new();
        };

        value
            .split(';')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .collect()
    }

    /// `base + suffix` for each suffix, keeping the ones that are directories.
    pub fn check_path_with_suffixes<S: AsRef<str>>(
        &mut self,
        base: &str,
        suffixes: &[S],
    ) -> Vec<PathBuf> {
        self.shown();
        suffixes
            .iter()
            .map(|suffix| PathBuf::from(format!("{}{}", base, suffix.as_ref())))
            .filter(|p| p.is_dir())
            .collect()
    }

    // --- Home-based resolution ---

    /// Resolve include paths, library paths and link flags for `name`.
    ///
    /// `<NAME>_INCLUDE` and `<NAME>_LIBPATH` override the directories derived
    /// from `<NAME>_HOME` for their own setting, and either one makes the home
    /// variable optional. `<NAME>_LINKFLAGS` is always applied. Returns the
    /// home path when set.
    pub fn check_home(
        &mut self,
        name: &str,
        opts: &HomeOptions,
        required: bool,
    ) -> Result<Option<String>> {
        self.shown();
        let prefix = var_prefix(name);
        let mut required = required;

        let user_inc = self.check_env_path(&format!("{}_INCLUDE", prefix));
        for path in &user_inc {
            self.settings_mut()
                .append_unique(keys::CPPPATH, [path.display().to_string()]);
            required = false;
        }

        let user_libpath = self.check_env_path(&format!("{}_LIBPATH", prefix));
        for path in &user_libpath {
            self.settings_mut()
                .prepend(keys::LIBPATH, [path.display().to_string()]);
            required = false;
        }

        if let Probe::Satisfied(flags) = self.check_env(&format!("{}_LINKFLAGS", prefix)) {
            self.settings_mut()
                .append_unique(keys::LINKFLAGS, flags.split_whitespace());
        }

        let home_var = format!("{}{}", prefix, opts.var_suffix);
        let home = self.check_env_var(&home_var, required)?;

        if let Some(home) = &home {
            if user_inc.is_empty() {
                for path in self.check_path_with_suffixes(home, &opts.inc_suffixes) {
                    self.settings_mut()
                        .append_unique(keys::CPPPATH, [path.display().to_string()]);
                }
            }

            if user_libpath.is_empty() {
                for path in self.check_path_with_suffixes(home, &opts.lib_suffixes) {
                    self.settings_mut()
                        .prepend(keys::LIBPATH, [path.display().to_string()]);
                }
            }
        }

        Ok(home)
    }

    pub fn require_home(&mut self, name: &str, opts: &HomeOptions) -> Result<Option<String>> {
        self.check_home(name, opts, true)
    }

    // --- Libraries, headers, functions ---

    /// Check that `lib` links, honouring `<LIB>_LIBPATH` and `<LIB>_LIBNAME`.
    ///
    /// On success the library (possibly renamed) is prepended to `LIBS` and
    /// returned.
    pub fn check_lib(&mut self, lib: &str, opts: LibOptions) -> Result<Probe<String>> {
        self.shown();
        let prefix = var_prefix(lib);

        if let Probe::Satisfied(path) = self.check_env(&format!("{}_LIBPATH", prefix)) {
            self.settings_mut().prepend(keys::LIBPATH, [path]);
        }

        let lib = match self.check_env(&format!("{}_LIBNAME", prefix)) {
            Probe::Satisfied(name) => name,
            Probe::Unsatisfied => lib.to_string(),
        };

        let found = self
            .env
            .backend()
            .check_lib(&self.backend_settings(), &lib, opts.lang)?;
        self.result(found);

        if !found {
            return Ok(Probe::Unsatisfied);
        }

        if opts.unique {
            self.settings_mut().prepend_unique(keys::LIBS, [lib.clone()]);
        } else {
            self.settings_mut().prepend(keys::LIBS, [lib.clone()]);
        }
        Ok(Probe::Satisfied(lib))
    }

    pub fn require_lib(&mut self, lib: &str, opts: LibOptions) -> Result<String> {
        self.check_lib(lib, opts)?
            .require(DependencyKind::Library, lib)
    }

    pub fn check_header(&mut self, header: &str, lang: Lang) -> Result<Probe<()>> {
        self.shown();
        self.message(&format!("Checking for {} header file {}...", lang, header));
        let found = self
            .env
            .backend()
            .check_header(&self.backend_settings(), header, lang)?;
        self.result(found);
        Ok(found.into())
    }

    pub fn require_header(&mut self, header: &str, lang: Lang) -> Result<()> {
        self.check_header(header, lang)?
            .require(DependencyKind::Header, header)
    }

    pub fn check_c_header(&mut self, header: &str) -> Result<Probe<()>> {
        self.check_header(header, Lang::C)
    }

    pub fn require_c_header(&mut self, header: &str) -> Result<()> {
        self.check_c_header(header)?
            .require(DependencyKind::CHeader, header)
    }

    pub fn check_cxx_header(&mut self, header: &str) -> Result<Probe<()>> {
        self.check_header(header, Lang::Cxx)
    }

    pub fn require_cxx_header(&mut self, header: &str) -> Result<()> {
        self.check_cxx_header(header)?
            .require(DependencyKind::CxxHeader, header)
    }

    pub fn check_func(&mut self, func: &str, lang: Lang) -> Result<Probe<()>> {
        self.shown();
        self.message(&format!("Checking for {} function {}()...", lang, func));
        let found = self
            .env
            .backend()
            .check_func(&self.backend_settings(), func, lang)?;
        self.result(found);
        Ok(found.into())
    }

    pub fn require_func(&mut self, func: &str, lang: Lang) -> Result<()> {
        self.check_func(func, lang)?
            .require(DependencyKind::Function, func)
    }

    // --- Composition ---

    /// Configure another tool as a nested transaction.
    pub fn config(&mut self, tool: &str, required: bool, args: &Args) -> Result<bool> {
        self.shown();
        configure::run_config(&mut *self.env, tool, required, args)
    }

    /// Invoke a registered probe by name.
    pub fn run_probe(&mut self, name: &str, args: &Args) -> Result<ProbeOutcome> {
        let probe = self
            .env
            .probe(name)
            .ok_or_else(|| ConfprobeError::UnknownProbe {
                name: name.to_string(),
            })?;
        self.shown();
        probe(self, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapVars;
    use crate::probe::{CcBackend, MockBackend};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn env_with(vars: MapVars, backend: MockBackend) -> Environment {
        Environment::new("test")
            .with_vars(vars)
            .with_backend(Arc::new(backend))
    }

    fn dir(temp: &TempDir, rel: &str) -> String {
        let path = temp.path().join(rel);
        fs::create_dir_all(&path).unwrap();
        path.display().to_string()
    }

    #[test]
    fn optional_env_absent_is_none() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let mut ctx = env.context();
        assert_eq!(ctx.check_env_var("NOPE", false).unwrap(), None);
        assert!(ctx.did_show_result());
    }

    #[test]
    fn required_env_absent_names_variable() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let mut ctx = env.context();
        let err = ctx.check_env_var("NOPE", true).unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn env_path_keeps_existing_dirs_in_order() {
        let temp = TempDir::new().unwrap();
        let a = dir(&temp, "a");
        let b = dir(&temp, "b");
        let missing = temp.path().join("missing").display().to_string();
        let value = format!("{};{};{}", b, missing, a);

        let mut env = env_with(MapVars::new().with("PATHS", value), MockBackend::new());
        let mut ctx = env.context();
        assert_eq!(
            ctx.check_env_path("PATHS"),
            vec![PathBuf::from(&b), PathBuf::from(&a)]
        );
    }

    #[test]
    fn path_with_suffixes_filters_missing() {
        let temp = TempDir::new().unwrap();
        dir(&temp, "home/include");
        let base = temp.path().join("home").display().to_string();

        let mut env = env_with(MapVars::new(), MockBackend::new());
        let mut ctx = env.context();
        let found = ctx.check_path_with_suffixes(&base, &["/include", "/inc"]);
        assert_eq!(found, vec![PathBuf::from(format!("{}/include", base))]);
    }

    #[test]
    fn home_derives_include_and_lib() {
        let temp = TempDir::new().unwrap();
        let inc = dir(&temp, "foo/include");
        let lib = dir(&temp, "foo/lib");
        let home = temp.path().join("foo").display().to_string();

        let mut env = env_with(MapVars::new().with("FOO_HOME", &home), MockBackend::new());
        let got = env
            .context()
            .check_home("foo", &HomeOptions::default(), true)
            .unwrap();

        assert_eq!(got.as_deref(), Some(home.as_str()));
        assert_eq!(env.settings().list(keys::CPPPATH), [inc]);
        assert_eq!(env.settings().list(keys::LIBPATH), [lib]);
    }

    #[test]
    fn include_override_suppresses_home_include() {
        let temp = TempDir::new().unwrap();
        dir(&temp, "a/include");
        let lib = dir(&temp, "a/lib");
        let b = dir(&temp, "b");
        let home = temp.path().join("a").display().to_string();

        let vars = MapVars::new()
            .with("FOO_HOME", &home)
            .with("FOO_INCLUDE", &b);
        let mut env = env_with(vars, MockBackend::new());
        env.context()
            .check_home("foo", &HomeOptions::default(), false)
            .unwrap();

        assert_eq!(env.settings().list(keys::CPPPATH), [b]);
        assert_eq!(env.settings().list(keys::LIBPATH), [lib]);
    }

    #[test]
    fn override_makes_home_optional() {
        let temp = TempDir::new().unwrap();
        let b = dir(&temp, "b");

        let mut env = env_with(MapVars::new().with("FOO_INCLUDE", &b), MockBackend::new());
        let got = env
            .context()
            .check_home("foo", &HomeOptions::default(), true)
            .unwrap();
        assert!(got.is_none());
        assert_eq!(env.settings().list(keys::CPPPATH), [b]);
    }

    #[test]
    fn home_required_without_overrides_fails() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let err = env
            .context()
            .require_home("lib-foo", &HomeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("LIB_FOO_HOME"));
    }

    #[test]
    fn libpath_override_entries_are_prepended_one_by_one() {
        let temp = TempDir::new().unwrap();
        let a = dir(&temp, "a");
        let b = dir(&temp, "b");

        let vars = MapVars::new().with("FOO_LIBPATH", format!("{};{}", a, b));
        let mut env = env_with(vars, MockBackend::new());
        env.context()
            .check_home("foo", &HomeOptions::default(), false)
            .unwrap();
        assert_eq!(env.settings().list(keys::LIBPATH), [b, a]);
    }

    #[test]
    fn linkflags_are_split_and_appended() {
        let vars = MapVars::new().with("FOO_LINKFLAGS", "-pthread  -rdynamic");
        let mut env = env_with(vars, MockBackend::new());
        env.context()
            .check_home("foo", &HomeOptions::default(), false)
            .unwrap();
        assert_eq!(
            env.settings().list(keys::LINKFLAGS),
            ["-pthread", "-rdynamic"]
        );
    }

    #[test]
    fn check_lib_prepends_found_library() {
        let mut env = env_with(MapVars::new(), MockBackend::new().with_lib("z"));
        env.settings_mut().append(keys::LIBS, ["m"]);

        let got = env.context().check_lib("z", LibOptions::default()).unwrap();
        assert_eq!(got, Probe::Satisfied("z".to_string()));
        assert_eq!(env.settings().list(keys::LIBS), ["z", "m"]);
    }

    #[test]
    fn check_lib_honours_libname_and_libpath() {
        let vars = MapVars::new()
            .with("SSL_LIBNAME", "ssl3")
            .with("SSL_LIBPATH", "/opt/ssl/lib");
        let mut env = env_with(vars, MockBackend::new().with_lib("ssl3"));

        let got = env.context().check_lib("ssl", LibOptions::default()).unwrap();
        assert_eq!(got, Probe::Satisfied("ssl3".to_string()));
        assert_eq!(env.settings().list(keys::LIBS), ["ssl3"]);
        assert_eq!(env.settings().list(keys::LIBPATH), ["/opt/ssl/lib"]);
    }

    #[test]
    fn check_lib_unique_skips_listed_library() {
        let mut env = env_with(MapVars::new(), MockBackend::new().with_lib("z"));
        env.settings_mut().append(keys::LIBS, ["m", "z"]);

        let opts = LibOptions {
            unique: true,
            ..Default::default()
        };
        env.context().check_lib("z", opts).unwrap();
        assert_eq!(env.settings().list(keys::LIBS), ["m", "z"]);
    }

    #[test]
    fn require_lib_names_library() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let err = env
            .context()
            .require_lib("png", LibOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing library: png");
    }

    #[test]
    fn header_variants_report_their_kind() {
        let mut env = env_with(MapVars::new(), MockBackend::new().with_header("zlib.h"));
        let mut ctx = env.context();

        assert!(ctx.check_c_header("zlib.h").unwrap().is_satisfied());
        ctx.require_header("zlib.h", Lang::C).unwrap();

        let err = ctx.require_cxx_header("vector").unwrap_err();
        assert_eq!(err.to_string(), "Missing C++ header: vector");

        let err = ctx.require_c_header("png.h").unwrap_err();
        assert_eq!(err.to_string(), "Missing C header: png.h");
    }

    #[test]
    fn backend_settings_take_compilers_from_vars() {
        let mut env = env_with(
            MapVars::new().with("CC", "clang").with("CXX", "clang++"),
            MockBackend::new(),
        );
        env.settings_mut().set_text(keys::CXX, "g++");
        let ctx = env.context();

        let settings = ctx.backend_settings();
        assert_eq!(CcBackend::compiler(&settings, Lang::C), "clang");
        assert_eq!(CcBackend::compiler(&settings, Lang::Cxx), "g++");
        assert!(ctx.settings().get(keys::CC).is_none());
    }

    #[test]
    fn backend_settings_borrow_when_nothing_to_fill() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let ctx = env.context();
        assert!(matches!(ctx.backend_settings(), Cow::Borrowed(_)));
    }

    #[test]
    fn func_probe_uses_backend() {
        let mut env = env_with(MapVars::new(), MockBackend::new().with_func("clock_gettime"));
        let mut ctx = env.context();
        assert!(ctx
            .check_func("clock_gettime", Lang::C)
            .unwrap()
            .is_satisfied());
        let err = ctx.require_func("epoll_wait", Lang::C).unwrap_err();
        assert_eq!(err.to_string(), "Missing function: epoll_wait");
    }

    #[test]
    fn run_probe_unknown_name_errors() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        let err = env.context().run_probe("nope", &Args::new()).unwrap_err();
        assert!(matches!(err, ConfprobeError::UnknownProbe { .. }));
    }

    #[test]
    fn fresh_context_has_shown_nothing() {
        let mut env = env_with(MapVars::new(), MockBackend::new());
        assert!(!env.context().did_show_result());
    }
}
