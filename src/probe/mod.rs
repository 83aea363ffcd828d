//! Dependency probes.
//!
//! A probe answers one question about the running environment ("is this
//! variable set", "does this header compile") and may record what it found in
//! the active settings. Probes return a tagged [`Probe`] outcome; whether an
//! unsatisfied outcome is fatal is decided once, by the caller, through
//! [`Probe::require`].
//!
//! # Modules
//!
//! - [`context`] - [`ProbeContext`], the read-through helpers probes run with
//! - [`registry`] - named probe functions
//! - [`args`] - arguments for named probes and configuration routines
//! - [`backend`] - compile/link test programs
//! - [`framework`] - macOS framework detection
//! - [`mock`] - scripted backend for tests

pub mod args;
pub mod backend;
pub mod context;
pub mod framework;
pub mod mock;
pub mod registry;

pub use args::Args;
pub use backend::{CcBackend, CompileBackend, Lang, MAIN_PROGRAM};
pub use context::{HomeOptions, LibOptions, ProbeContext};
pub use framework::check_osx_framework;
pub use mock::MockBackend;
pub use registry::{ProbeFn, ProbeRegistry};

use crate::error::{ConfprobeError, DependencyKind, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Satisfied(T),
    Unsatisfied,
}

impl<T> Probe<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Probe::Satisfied(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Probe::Satisfied(value) => Some(value),
            Probe::Unsatisfied => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Satisfied(value) => Probe::Satisfied(f(value)),
            Probe::Unsatisfied => Probe::Unsatisfied,
        }
    }

    /// Convert an unsatisfied outcome into a [`ConfprobeError::MissingDependency`].
    pub fn require(self, kind: DependencyKind, name: &str) -> Result<T> {
        match self {
            Probe::Satisfied(value) => Ok(value),
            Probe::Unsatisfied => Err(ConfprobeError::MissingDependency {
                kind,
                name: name.to_string(),
            }),
        }
    }
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Probe::Satisfied(v),
            None => Probe::Unsatisfied,
        }
    }
}

impl From<bool> for Probe<()> {
    fn from(found: bool) -> Self {
        if found {
            Probe::Satisfied(())
        } else {
            Probe::Unsatisfied
        }
    }
}

/// Value carried by a satisfied named probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProbeValue {
    Found,
    Text(String),
    Paths(Vec<PathBuf>),
}

/// Outcome of a named probe.
pub type ProbeOutcome = Probe<ProbeValue>;

impl From<Probe<()>> for ProbeOutcome {
    fn from(probe: Probe<()>) -> Self {
        probe.map(|()| ProbeValue::Found)
    }
}

impl From<Probe<String>> for ProbeOutcome {
    fn from(probe: Probe<String>) -> Self {
        probe.map(ProbeValue::Text)
    }
}

impl From<Vec<PathBuf>> for ProbeOutcome {
    fn from(paths: Vec<PathBuf>) -> Self {
        if paths.is_empty() {
            Probe::Unsatisfied
        } else {
            Probe::Satisfied(ProbeValue::Paths(paths))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_value_through() {
        let probe = Probe::Satisfied("/opt/demo".to_string());
        assert_eq!(
            probe.require(DependencyKind::EnvVar, "DEMO_HOME").unwrap(),
            "/opt/demo"
        );
    }

    #[test]
    fn require_names_missing_item() {
        let probe: Probe<String> = Probe::Unsatisfied;
        let err = probe
            .require(DependencyKind::EnvVar, "DEMO_HOME")
            .unwrap_err();
        assert!(err.to_string().contains("DEMO_HOME"));
    }

    #[test]
    fn empty_path_list_is_unsatisfied() {
        let outcome: ProbeOutcome = Vec::<PathBuf>::new().into();
        assert!(!outcome.is_satisfied());
    }

    #[test]
    fn bool_converts_to_probe() {
        assert!(Probe::from(true).is_satisfied());
        assert_eq!(Probe::from(false), Probe::<()>::Unsatisfied);
    }

    #[test]
    fn option_converts_to_probe() {
        assert_eq!(Probe::from(Some(3)), Probe::Satisfied(3));
        assert_eq!(Probe::<i32>::from(None), Probe::Unsatisfied);
    }
}
