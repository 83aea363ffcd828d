//! Compile and link test programs.
//!
//! Header, library and function probes answer their question by building a
//! tiny program against the active settings. [`CompileBackend`] is the seam:
//! [`CcBackend`] runs the system compiler, and tests substitute
//! [`MockBackend`](super::MockBackend).

use crate::env::{keys, BuildEnv};
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Program that only needs to link.
pub const MAIN_PROGRAM: &str = "int main(int argc, char **argv) {return 0;}\n";

/// Source language of a test program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Lang {
    #[default]
    #[serde(rename = "c")]
    C,
    #[serde(rename = "c++", alias = "cxx")]
    Cxx,
}

impl Lang {
    /// Parse a language name (`c`, `c++` or `cxx`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "c" => Some(Lang::C),
            "c++" | "cxx" | "cpp" => Some(Lang::Cxx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Lang::C => "c",
            Lang::Cxx => "cpp",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lang::C => f.write_str("C"),
            Lang::Cxx => f.write_str("C++"),
        }
    }
}

/// Builds test programs against a settings record.
pub trait CompileBackend: Send + Sync + fmt::Debug {
    /// Compile `source` without linking.
    fn try_compile(&self, env: &BuildEnv, source: &str, lang: Lang) -> Result<bool>;

    /// Compile and link `source`.
    fn try_link(&self, env: &BuildEnv, source: &str, lang: Lang) -> Result<bool>;

    fn check_header(&self, env: &BuildEnv, header: &str, lang: Lang) -> Result<bool> {
        self.try_compile(env, &header_program(header), lang)
    }

    /// Link an empty program with `lib` added ahead of the configured libraries.
    fn check_lib(&self, env: &BuildEnv, lib: &str, lang: Lang) -> Result<bool> {
        let mut probe_env = env.clone();
        probe_env.prepend(keys::LIBS, [lib]);
        self.try_link(&probe_env, MAIN_PROGRAM, lang)
    }

    fn check_func(&self, env: &BuildEnv, func: &str, lang: Lang) -> Result<bool> {
        self.try_link(env, &func_program(func), lang)
    }
}

/// Program that includes a header.
pub fn header_program(header: &str) -> String {
    format!("#include <{}>\n\n{}", header, MAIN_PROGRAM)
}

/// Program that references a function by a dummy prototype.
pub fn func_program(func: &str) -> String {
    format!(
        "#ifdef __cplusplus\nextern \"C\"\n#endif\nchar {func}();\n\n\
         int main(int argc, char **argv) {{\n  return (int)(long){func}();\n}}\n"
    )
}

/// Runs the system C/C++ compiler in a scratch directory.
#[derive(Debug)]
pub struct CcBackend {
    scratch_dir: PathBuf,
    counter: AtomicUsize,
}

impl CcBackend {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Compiler for `lang`: the settings key, then `cc` / `c++`.
    pub fn compiler(env: &BuildEnv, lang: Lang) -> String {
        let (key, fallback) = match lang {
            Lang::C => (keys::CC, "cc"),
            Lang::Cxx => (keys::CXX, "c++"),
        };
        env.get_text(key).unwrap_or(fallback).to_string()
    }

    /// Preprocessor flags from the settings.
    pub fn compile_flags(env: &BuildEnv) -> Vec<String> {
        let mut flags = Vec::new();
        for path in env.list(keys::CPPPATH) {
            flags.push(format!("-I{}", path));
        }
        for define in env.list(keys::CPPDEFINES) {
            flags.push(format!("-D{}", define));
        }
        flags
    }

    /// Linker flags from the settings. Must follow the source file.
    pub fn link_flags(env: &BuildEnv) -> Vec<String> {
        let mut flags = Vec::new();
        for path in env.list(keys::LIBPATH) {
            flags.push(format!("-L{}", path));
        }
        flags.extend(env.list(keys::LINKFLAGS).iter().cloned());
        for framework in env.list(keys::FRAMEWORKS) {
            flags.push("-framework".to_string());
            flags.push(framework.clone());
        }
        for lib in env.list(keys::LIBS) {
            flags.push(format!("-l{}", lib));
        }
        flags
    }

    fn run(&self, env: &BuildEnv, source: &str, lang: Lang, link: bool) -> Result<bool> {
        fs::create_dir_all(&self.scratch_dir)?;

        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let src = self
            .scratch_dir
            .join(format!("conftest_{}.{}", n, lang.extension()));
        let out = self
            .scratch_dir
            .join(format!("conftest_{}{}", n, if link { "" } else { ".o" }));
        fs::write(&src, source)?;

        let compiler = Self::compiler(env, lang);
        let mut cmd = Command::new(&compiler);
        cmd.args(Self::compile_flags(env));
        if !link {
            cmd.arg("-c");
        }
        cmd.arg(&src).arg("-o").arg(&out);
        if link {
            cmd.args(Self::link_flags(env));
        }

        tracing::debug!("Running {:?}", cmd);
        let result = cmd.output();

        let _ = fs::remove_file(&src);
        let _ = fs::remove_file(&out);

        match result {
            Ok(output) => {
                if !output.status.success() {
                    tracing::debug!(
                        "{} probe failed: {}",
                        lang,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(output.status.success())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Compiler '{}' not found", compiler);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl CompileBackend for CcBackend {
    fn try_compile(&self, env: &BuildEnv, source: &str, lang: Lang) -> Result<bool> {
        self.run(env, source, lang, false)
    }

    fn try_link(&self, env: &BuildEnv, source: &str, lang: Lang) -> Result<bool> {
        self.run(env, source, lang, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lang_parses_aliases() {
        assert_eq!(Lang::parse("C"), Some(Lang::C));
        assert_eq!(Lang::parse("c++"), Some(Lang::Cxx));
        assert_eq!(Lang::parse("cxx"), Some(Lang::Cxx));
        assert_eq!(Lang::parse("fortran"), None);
    }

    #[test]
    fn compiler_prefers_settings() {
        let mut env = BuildEnv::new("test");
        env.set_text(keys::CC, "my-cc");
        assert_eq!(CcBackend::compiler(&env, Lang::C), "my-cc");
        assert_eq!(CcBackend::compiler(&env, Lang::Cxx), "c++");
    }

    #[test]
    fn compile_flags_cover_paths_and_defines() {
        let mut env = BuildEnv::new("test");
        env.append(keys::CPPPATH, ["/opt/include"]);
        env.append(keys::CPPDEFINES, ["DEBUG", "LEVEL=2"]);
        assert_eq!(
            CcBackend::compile_flags(&env),
            ["-I/opt/include", "-DDEBUG", "-DLEVEL=2"]
        );
    }

    #[test]
    fn link_flags_put_libs_last() {
        let mut env = BuildEnv::new("test");
        env.append(keys::LIBS, ["z"]);
        env.append(keys::LIBPATH, ["/opt/lib"]);
        env.append(keys::LINKFLAGS, ["-pthread"]);
        assert_eq!(
            CcBackend::link_flags(&env),
            ["-L/opt/lib", "-pthread", "-lz"]
        );
    }

    #[test]
    fn header_program_includes_header() {
        let program = header_program("zlib.h");
        assert!(program.starts_with("#include <zlib.h>"));
        assert!(program.contains("int main"));
    }

    #[test]
    fn func_program_declares_function() {
        let program = func_program("deflate");
        assert!(program.contains("char deflate();"));
        assert!(program.contains("deflate()"));
    }

    #[test]
    fn missing_compiler_reports_unsatisfied() {
        let temp = TempDir::new().unwrap();
        let backend = CcBackend::new(temp.path().join("scratch"));
        let mut env = BuildEnv::new("test");
        env.set_text(keys::CC, "/nonexistent/compiler/cc");

        assert!(!backend.try_link(&env, MAIN_PROGRAM, Lang::C).unwrap());
        assert!(backend.scratch_dir().is_dir());
    }
}
