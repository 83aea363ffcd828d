//! Declared configuration variables and option files.
//!
//! A build description declares the variables it understands. Values come from
//! YAML option files (later files override earlier ones) and otherwise fall back
//! to each variable's declared default.

use crate::env::settings::{BuildEnv, Value};
use crate::error::{ConfprobeError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// How a variable's raw value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    #[default]
    Text,
    Bool,
    /// Whitespace-separated list.
    List,
}

/// A declared configuration variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Variable {
    pub name: String,

    #[serde(default)]
    pub help: String,

    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            default: None,
            kind: VariableKind::Text,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = kind;
        self
    }

    /// Convert a raw value according to the variable's kind.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        match self.kind {
            VariableKind::Text => Ok(Value::Text(raw.to_string())),
            VariableKind::List => Ok(Value::List(
                raw.split_whitespace().map(String::from).collect(),
            )),
            VariableKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "yes" | "true" | "on" | "y" | "t" => Ok(Value::Text("true".into())),
                "0" | "no" | "false" | "off" | "n" | "f" => Ok(Value::Text("false".into())),
                other => Err(ConfprobeError::InvalidVariable {
                    name: self.name.clone(),
                    message: format!("expected a boolean, got '{}'", other),
                }),
            },
        }
    }
}

/// Load a YAML option file into `name -> raw value`.
///
/// Scalars are stringified; sequences are joined with spaces so they can feed
/// list variables.
pub fn load_option_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: BTreeMap<String, serde_yaml::Value> =
        serde_yaml::from_str(&content).map_err(|e| ConfprobeError::ProjectParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut options = BTreeMap::new();
    for (key, value) in raw {
        let text = match value {
            serde_yaml::Value::Sequence(items) => items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(" "),
            other => match scalar_to_string(&other) {
                Some(s) => s,
                None => {
                    return Err(ConfprobeError::ProjectParse {
                        path: path.to_path_buf(),
                        message: format!("option '{}' must be a scalar or a list", key),
                    })
                }
            },
        };
        options.insert(key, text);
    }

    Ok(options)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Apply declared variables to the settings.
///
/// `option_sets` are consulted last-to-first; the first one defining a variable
/// wins, otherwise the declared default is used. Variables with neither are left
/// untouched.
pub fn apply_variables(
    settings: &mut BuildEnv,
    variables: &[Variable],
    option_sets: &[BTreeMap<String, String>],
) -> Result<()> {
    for var in variables {
        let raw = option_sets
            .iter()
            .rev()
            .find_map(|set| set.get(&var.name))
            .or(var.default.as_ref());

        if let Some(raw) = raw {
            settings.set(var.name.clone(), var.parse(raw)?);
        }
    }

    for set in option_sets {
        for key in set.keys() {
            if !variables.iter().any(|v| &v.name == key) {
                tracing::debug!("Ignoring undeclared option '{}'", key);
            }
        }
    }

    Ok(())
}

/// Render help text for the declared variables.
pub fn help_text(variables: &[Variable], settings: &BuildEnv) -> String {
    let mut out = String::new();
    for var in variables {
        out.push_str(&format!("\n{}: {}\n", var.name, var.help));
        out.push_str(&format!(
            "    default: {}\n",
            var.default.as_deref().unwrap_or("None")
        ));
        let actual = settings
            .get(&var.name)
            .map(|v| v.as_list().join(" "))
            .unwrap_or_else(|| "None".to_string());
        out.push_str(&format!("    actual: {}\n", actual));
    }
    out
}
