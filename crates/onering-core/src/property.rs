//! Property types for graph entities
//!
//! Scalar property values, the property map carried by nodes and edges, and the
//! safe literal coercion applied to every value written through ORQL.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar property value stored on nodes and edges
///
/// Equality is exact and type-sensitive: `Integer(1)`, `Float(1.0)` and
/// `String("1")` are three different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Null/missing value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 string
    String(String),
}

impl PropertyValue {
    /// Interpret a raw query token as a scalar.
    ///
    /// Quoted tokens are always strings. Bare tokens are checked against a closed
    /// literal grammar (integer, float, boolean, null) and otherwise kept verbatim.
    /// Nothing is ever evaluated.
    pub fn from_literal(raw: &str) -> Self {
        if let Some(inner) = strip_quotes(raw) {
            return PropertyValue::String(inner.to_string());
        }

        match raw {
            "true" | "True" | "TRUE" => return PropertyValue::Boolean(true),
            "false" | "False" | "FALSE" => return PropertyValue::Boolean(false),
            "null" | "Null" | "NULL" | "None" => return PropertyValue::Null,
            _ => {}
        }

        if is_integer_literal(raw) {
            if let Ok(i) = raw.parse::<i64>() {
                return PropertyValue::Integer(i);
            }
        } else if is_float_literal(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                return PropertyValue::Float(f);
            }
        }

        PropertyValue::String(raw.to_string())
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn strip_quotes(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&raw[1..raw.len() - 1]);
        }
    }
    None
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    match unsigned.split_once('.') {
        Some((whole, frac)) => {
            is_integer_literal(whole) && is_integer_literal(frac) && !frac.starts_with('-')
        }
        None => false,
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{:?}", x),
            PropertyValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

// Convenience From implementations
impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Integer(v as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

/// JSON scalars map one to one; arrays and objects are kept as their JSON text.
impl From<serde_json::Value> for PropertyValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                None => n
                    .as_f64()
                    .map(PropertyValue::Float)
                    .unwrap_or_else(|| PropertyValue::String(n.to_string())),
            },
            Value::String(s) => PropertyValue::String(s),
            nested @ (Value::Array(_) | Value::Object(_)) => {
                PropertyValue::String(nested.to_string())
            }
        }
    }
}

/// One key touched by a merge, with the value it replaced
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub key: String,
    pub old: Option<PropertyValue>,
    pub new: PropertyValue,
}

/// The property map of a node or edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    inner: BTreeMap<String, PropertyValue>,
}

impl Properties {
    /// Create an empty property map
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    /// Create with a single property
    pub fn with<K: Into<String>, V: Into<PropertyValue>>(key: K, value: V) -> Self {
        let mut props = Self::new();
        props.set(key, value);
        props
    }

    /// Set a property value, returning the previous one
    pub fn set<K: Into<String>, V: Into<PropertyValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<PropertyValue> {
        self.inner.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.inner.get(key)
    }

    /// Check if a property exists
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Get the number of properties
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over properties in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.inner.iter()
    }

    /// Merge another map into this one. Existing keys are overwritten, new keys
    /// inserted, untouched keys kept. Returns every key written with its old value.
    pub fn merge(&mut self, other: Properties) -> Vec<PropertyChange> {
        other
            .inner
            .into_iter()
            .map(|(key, new)| {
                let old = self.inner.insert(key.clone(), new.clone());
                PropertyChange { key, old, new }
            })
            .collect()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl IntoIterator for Properties {
    type Item = (String, PropertyValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
