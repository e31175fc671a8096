//! Parameter values and value-kind classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single workflow parameter value as recorded by the run registry.
///
/// The registry speaks plain JSON primitives, so serialization is untagged:
/// `true`, `7`, `0.25`, `"tabby"` round-trip as themselves. Deserialization
/// is the one normalization point for numeric wire types: a number lexed as
/// an integer becomes [`ParamValue::Int`], any other number becomes
/// [`ParamValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Float(_) => ValueKind::Float,
            ParamValue::Str(_) => ValueKind::Str,
        }
    }

    /// Convert into the JSON value published to the event bus.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(f) => Value::from(*f),
            ParamValue::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

/// The closed set of parameter kinds the edit form can render.
///
/// Classification drives which control a parameter gets (checkbox, stepped
/// number, number, free text) and what its default is, so it must be stable
/// for the lifetime of one loaded catalog. Precedence is bool before int
/// before float before string; booleans must never be misclassified as
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    /// Classify a representative sample value for a parameter.
    ///
    /// The sample is the first non-missing historical value across all
    /// loaded runs; a parameter with no recorded value anywhere falls back
    /// to [`ValueKind::Str`].
    pub fn classify(sample: Option<&ParamValue>) -> ValueKind {
        sample.map(ParamValue::kind).unwrap_or(ValueKind::Str)
    }

    /// The control value used when a parameter has no active selection.
    pub fn default_value(self) -> ParamValue {
        match self {
            ValueKind::Bool => ParamValue::Bool(false),
            ValueKind::Int => ParamValue::Int(0),
            ValueKind::Float => ParamValue::Float(0.0),
            ValueKind::Str => ParamValue::Str(String::new()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
        };
        f.write_str(name)
    }
}
