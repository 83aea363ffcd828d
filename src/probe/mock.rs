//! Scripted compile backend for testing.
//!
//! `MockBackend` answers header, library and function checks from configured
//! sets and records every query for later assertion.
//!
//! # Example
//!
//! ```
//! use confprobe::env::BuildEnv;
//! use confprobe::probe::{CompileBackend, Lang, MockBackend};
//!
//! let backend = MockBackend::new().with_header("zlib.h").with_lib("z");
//! let env = BuildEnv::new("test");
//!
//! assert!(backend.check_header(&env, "zlib.h", Lang::C).unwrap());
//! assert!(!backend.check_lib(&env, "ssl", Lang::C).unwrap());
//! assert_eq!(backend.queries(), ["header:zlib.h", "lib:ssl"]);
//! ```

use crate::env::BuildEnv;
use crate::error::Result;
use std::collections::HashSet;
use std::sync::Mutex;

use super::backend::{CompileBackend, Lang};

/// Compile backend with pre-determined answers.
#[derive(Debug, Default)]
pub struct MockBackend {
    headers: HashSet<String>,
    libs: HashSet<String>,
    funcs: HashSet<String>,
    links: bool,
    queries: Mutex<Vec<String>>,
}

impl MockBackend {
    /// A backend where nothing is available and linking fails.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: &str) -> Self {
        self.headers.insert(header.to_string());
        self
    }

    pub fn with_lib(mut self, lib: &str) -> Self {
        self.libs.insert(lib.to_string());
        self
    }

    pub fn with_func(mut self, func: &str) -> Self {
        self.funcs.insert(func.to_string());
        self
    }

    /// Whether plain compile/link test programs succeed.
    pub fn linking(mut self, links: bool) -> Self {
        self.links = links;
        self
    }

    /// Every query made so far, as `kind:name`.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn record(&self, query: String) {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query);
        }
    }
}

impl CompileBackend for MockBackend {
    fn try_compile(&self, _env: &BuildEnv, _source: &str, _lang: Lang) -> Result<bool> {
        self.record("compile".to_string());
        Ok(self.links)
    }

    fn try_link(&self, _env: &BuildEnv, _source: &str, _lang: Lang) -> Result<bool> {
        self.record("link".to_string());
        Ok(self.links)
    }

    fn check_header(&self, _env: &BuildEnv, header: &str, _lang: Lang) -> Result<bool> {
        self.record(format!("header:{}", header));
        Ok(self.headers.contains(header))
    }

    fn check_lib(&self, _env: &BuildEnv, lib: &str, _lang: Lang) -> Result<bool> {
        self.record(format!("lib:{}", lib));
        Ok(self.libs.contains(lib))
    }

    fn check_func(&self, _env: &BuildEnv, func: &str, _lang: Lang) -> Result<bool> {
        self.record(format!("func:{}", func));
        Ok(self.funcs.contains(func))
    }
}
