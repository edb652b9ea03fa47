//! Property values for plan, request and manifest property blocks
//!
//! Property blocks arrive from the broker as free-form JSON or YAML. Instead of
//! carrying untyped maps around, every value is decoded into the closed
//! [`PropertyValue`] variant at the boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property block: string keys to typed values
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(Properties),
}

impl PropertyValue {
    /// Name of the variant, used in type mismatch diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "a boolean",
            PropertyValue::Integer(_) => "an integer",
            PropertyValue::Float(_) => "a number",
            PropertyValue::String(_) => "a string",
            PropertyValue::List(_) => "a list",
            PropertyValue::Map(_) => "a map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value; floats are not coerced
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of either an integer or a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Properties> {
        match self {
            PropertyValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<Properties> for PropertyValue {
    fn from(value: Properties) -> Self {
        PropertyValue::Map(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(value: Vec<T>) -> Self {
        PropertyValue::List(value.into_iter().map(Into::into).collect())
    }
}
