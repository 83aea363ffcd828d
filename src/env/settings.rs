//! The mutable build settings record.
//!
//! [`BuildEnv`] is the part of an [`Environment`](super::Environment) that a
//! configuration transaction snapshots, mutates, and commits. Values are either
//! scalar text or ordered lists, and each list-valued setting is edited with
//! append or prepend semantics depending on its link-order precedence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known setting keys.
pub mod keys {
    /// Include search paths (appended unique).
    pub const CPPPATH: &str = "CPPPATH";
    /// Library search paths (prepended).
    pub const LIBPATH: &str = "LIBPATH";
    /// Libraries to link (prepended).
    pub const LIBS: &str = "LIBS";
    /// Extra linker flags (appended unique).
    pub const LINKFLAGS: &str = "LINKFLAGS";
    /// Preprocessor defines (appended unique).
    pub const CPPDEFINES: &str = "CPPDEFINES";
    /// macOS frameworks (prepended unique).
    pub const FRAMEWORKS: &str = "FRAMEWORKS";
    /// C compiler override.
    pub const CC: &str = "CC";
    /// C++ compiler override.
    pub const CXX: &str = "CXX";
}

/// A single setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

impl Value {
    /// View the value as a list. Text is a one-element list.
    pub fn as_list(&self) -> &[String] {
        match self {
            Value::Text(s) => std::slice::from_ref(s),
            Value::List(items) => items,
        }
    }

    /// View the value as text, if it is scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::List(_) => None,
        }
    }
}

/// Named key/value build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnv {
    name: String,
    values: BTreeMap<String, Value>,
}

impl BuildEnv {
    /// Create an empty settings record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// The environment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a scalar text value.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_text)
    }

    /// Get a list value. Missing keys read as an empty list.
    pub fn list(&self, key: &str) -> &[String] {
        self.values.get(key).map(Value::as_list).unwrap_or(&[])
    }

    /// Check whether a list setting contains an item.
    pub fn contains(&self, key: &str, item: &str) -> bool {
        self.list(key).iter().any(|v| v == item)
    }

    /// Set a value, replacing whatever was there.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Set a scalar text value.
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, Value::Text(value.into()));
    }

    /// Set a list value.
    pub fn set_list<I, S>(&mut self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(key, Value::List(items.into_iter().map(Into::into).collect()));
    }

    /// Remove a key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Append items to a list setting.
    pub fn append<I, S>(&mut self, key: &str, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.list_mut(key);
        list.extend(items.into_iter().map(Into::into));
    }

    /// Append items not already present.
    pub fn append_unique<I, S>(&mut self, key: &str, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.list_mut(key);
        for item in items {
            let item = item.into();
            if !list.contains(&item) {
                list.push(item);
            }
        }
    }

    /// Prepend items, keeping their relative order, ahead of existing entries.
    pub fn prepend<I, S>(&mut self, key: &str, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.list_mut(key);
        let mut front: Vec<String> = items.into_iter().map(Into::into).collect();
        front.append(list);
        *list = front;
    }

    /// Prepend items not already present. Existing entries are not moved.
    pub fn prepend_unique<I, S>(&mut self, key: &str, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.list_mut(key);
        let mut front: Vec<String> = Vec::new();
        for item in items {
            let item = item.into();
            if !list.contains(&item) && !front.contains(&item) {
                front.push(item);
            }
        }
        front.append(list);
        *list = front;
    }

    fn list_mut(&mut self, key: &str) -> &mut Vec<String> {
        let entry = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()));

        if let Value::Text(text) = entry {
            let existing = std::mem::take(text);
            *entry = Value::List(if existing.is_empty() {
                Vec::new()
            } else {
                vec![existing]
            });
        }

        match entry {
            Value::List(items) => items,
            Value::Text(_) => unreachable!("text values are converted above"),
        }
    }
}
