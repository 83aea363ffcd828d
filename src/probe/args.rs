//! Arguments passed to named probes and configuration routines.

use crate::error::{ConfprobeError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Positional and keyword arguments.
///
/// # Example
///
/// ```
/// use confprobe::probe::Args;
///
/// let args = Args::positional(["zlib"]).with("unique", "yes");
/// assert_eq!(args.arg(0), Some("zlib"));
/// assert!(args.flag("unique"));
/// assert!(!args.flag("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Args {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positional: items.into_iter().map(Into::into).collect(),
            options: BTreeMap::new(),
        }
    }

    /// Builder-style keyword argument.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Positional argument that must be present.
    pub fn expect_arg(&self, index: usize, probe: &str) -> Result<&str> {
        self.arg(index).ok_or_else(|| {
            ConfprobeError::Other(anyhow::anyhow!(
                "probe `{}` expects at least {} argument(s)",
                probe,
                index + 1
            ))
        })
    }

    /// Positional arguments from `index` onwards.
    pub fn rest(&self, index: usize) -> &[String] {
        self.positional.get(index..).unwrap_or(&[])
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Boolean keyword; absent reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.flag_or(key, false)
    }

    /// Boolean keyword with an explicit default.
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "yes" | "true" | "on"
            ),
            None => default,
        }
    }

    /// Whitespace-separated list keyword.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key)
            .map(|v| v.split_whitespace().map(String::from).collect())
    }

    /// A copy without the given keyword.
    pub fn without(&self, key: &str) -> Self {
        let mut copy = self.clone();
        copy.options.remove(key);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_arg_errors_when_missing() {
        let args = Args::new();
        let err = args.expect_arg(0, "check_env").unwrap_err();
        assert!(err.to_string().contains("check_env"));
    }

    #[test]
    fn rest_returns_tail() {
        let args = Args::positional(["/opt", "/include", "/inc"]);
        assert_eq!(args.rest(1), ["/include", "/inc"]);
        assert!(args.rest(5).is_empty());
    }

    #[test]
    fn flag_or_uses_default_when_absent() {
        let args = Args::new().with("required", "false");
        assert!(!args.flag_or("required", true));
        assert!(Args::new().flag_or("required", true));
    }

    #[test]
    fn list_splits_whitespace() {
        let args = Args::new().with("inc_suffix", "/include /inc");
        assert_eq!(
            args.list("inc_suffix").unwrap(),
            vec!["/include".to_string(), "/inc".to_string()]
        );
        assert!(args.list("lib_suffix").is_none());
    }

    #[test]
    fn deserializes_from_yaml() {
        let args: Args = serde_yaml::from_str("positional: [zlib]\noptions:\n  unique: yes\n")
            .unwrap();
        assert_eq!(args.arg(0), Some("zlib"));
        assert!(args.flag("unique"));
    }
}
