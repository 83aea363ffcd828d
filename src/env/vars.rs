//! Process variable lookup.
//!
//! Probes never read `std::env` directly. They go through a [`VarSource`] so
//! that tests and embedders can supply variables without mutating the
//! process environment.

use std::collections::HashMap;
use std::fmt;

/// Source of environment variables.
pub trait VarSource: Send + Sync + fmt::Debug {
    /// Look up a variable. Unset variables and non-UTF-8 values read as `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads variables from the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVars;

impl VarSource for SystemVars {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed map of variables.
///
/// # Example
///
/// ```
/// use confprobe::env::{MapVars, VarSource};
///
/// let vars = MapVars::new().with("DEMO_HOME", "/opt/demo");
/// assert_eq!(vars.var("DEMO_HOME").as_deref(), Some("/opt/demo"));
/// assert!(vars.var("OTHER").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MapVars {
    vars: HashMap<String, String>,
}

impl MapVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl VarSource for MapVars {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapVars {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Variable prefix for a tool or library name: uppercased, `-` replaced by `_`.
pub fn var_prefix(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}
