//! Input parameter dictionaries and their typed, parsed form.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::quantity::Quantity;

/// Raw parameter text as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        ParamValue::Scalar(text.into())
    }

    pub fn list<S: AsRef<str>>(items: &[S]) -> Self {
        ParamValue::List(items.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

/// Lists render as `['a', 'b']` so sweep tags and sidecars stay stable.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(s) => f.write_str(s),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{item}'")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Insertion-ordered map of parameter name to raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputParameters {
    entries: Vec<(String, ParamValue)>,
}

impl InputParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of `insert` for a single value.
    pub fn scalar(mut self, name: &str, text: &str) -> Self {
        self.insert(name, ParamValue::scalar(text));
        self
    }

    /// Builder form of `insert` for a list value.
    pub fn list(mut self, name: &str, items: &[&str]) -> Self {
        self.insert(name, ParamValue::list(items));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of `self` with one key overridden. `self` is left untouched.
    pub fn with_override(&self, name: &str, value: ParamValue) -> Self {
        let mut copy = self.clone();
        copy.insert(name, value);
        copy
    }

    /// Apply every entry of `other` on top of `self`.
    pub fn merged(&self, other: &InputParameters) -> Self {
        let mut copy = self.clone();
        for (name, value) in other.iter() {
            copy.insert(name, value.clone());
        }
        copy
    }

    /// Read a JSON object of numbers, strings, or arrays of those.
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ParseError::InvalidJson {
                reason: e.to_string(),
            })?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, ParseError> {
        let object = value.as_object().ok_or_else(|| ParseError::InvalidJson {
            reason: "expected an object of parameter values".to_string(),
        })?;
        let mut params = Self::new();
        for (name, entry) in object {
            let parsed = match entry {
                serde_json::Value::Array(items) => ParamValue::List(
                    items
                        .iter()
                        .map(|item| json_text(name, item))
                        .collect::<Result<_, _>>()?,
                ),
                other => ParamValue::Scalar(json_text(name, other)?),
            };
            params.insert(name.clone(), parsed);
        }
        Ok(params)
    }
}

fn json_text(name: &str, value: &serde_json::Value) -> Result<String, ParseError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(ParseError::InvalidJson {
            reason: format!("parameter '{name}' has unsupported value {other}"),
        }),
    }
}

/// Expand list values into `name1, name2, ...` entries (1-based).
pub fn breakup_lists(params: &InputParameters) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(params.len());
    for (name, value) in params.iter() {
        match value {
            ParamValue::Scalar(s) => out.push((name.to_string(), s.clone())),
            ParamValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    out.push((format!("{name}{}", i + 1), item.clone()));
                }
            }
        }
    }
    out
}

/// Parsed value of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedValue {
    Single(Quantity),
    Many(Vec<Quantity>),
}

/// Typed parameters, ready for model construction.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: HashMap<String, ParsedValue>,
}

impl Parameters {
    pub fn get(&self, name: &str) -> Result<&ParsedValue, ParseError> {
        self.values
            .get(name)
            .ok_or_else(|| ParseError::MissingParameter {
                name: name.to_string(),
            })
    }

    fn single(&self, name: &str) -> Result<Quantity, ParseError> {
        match self.get(name)? {
            ParsedValue::Single(q) => Ok(*q),
            ParsedValue::Many(_) => Err(ParseError::ExpectedScalar {
                name: name.to_string(),
            }),
        }
    }

    fn many(&self, name: &str) -> Result<&[Quantity], ParseError> {
        match self.get(name)? {
            ParsedValue::Many(qs) => Ok(qs),
            ParsedValue::Single(_) => Err(ParseError::ExpectedList {
                name: name.to_string(),
            }),
        }
    }

    /// Length in millimetres.
    pub fn length(&self, name: &str) -> Result<f64, ParseError> {
        self.single(name)?.as_length(name)
    }

    /// Angle in degrees.
    pub fn angle(&self, name: &str) -> Result<f64, ParseError> {
        self.single(name)?.as_angle(name)
    }

    pub fn scalar(&self, name: &str) -> Result<f64, ParseError> {
        self.single(name)?.as_scalar(name)
    }

    pub fn lengths(&self, name: &str) -> Result<Vec<f64>, ParseError> {
        self.many(name)?.iter().map(|q| q.as_length(name)).collect()
    }

    pub fn angles(&self, name: &str) -> Result<Vec<f64>, ParseError> {
        self.many(name)?.iter().map(|q| q.as_angle(name)).collect()
    }
}

/// Parse every raw value into a `Quantity`.
pub fn parse_input_parameters(params: &InputParameters) -> Result<Parameters, ParseError> {
    let mut values = HashMap::with_capacity(params.len());
    for (name, value) in params.iter() {
        let parsed = match value {
            ParamValue::Scalar(s) => ParsedValue::Single(Quantity::parse(s)?),
            ParamValue::List(items) => ParsedValue::Many(
                items
                    .iter()
                    .map(|s| Quantity::parse(s))
                    .collect::<Result<_, _>>()?,
            ),
        };
        values.insert(name.to_string(), parsed);
    }
    Ok(Parameters { values })
}

/// Filesystem-safe rendering of a swept value.
pub fn sweep_value_tag(value: &ParamValue) -> String {
    value
        .to_string()
        .replace('.', "p")
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '[' | ']' | '\''))
        .collect::<String>()
        .replace('-', "m")
}

/// Directory tag of one sweep iteration.
pub fn model_tag(variable: &str, value: &ParamValue) -> String {
    format!("{variable}_sweep_value_{}", sweep_value_tag(value))
}
