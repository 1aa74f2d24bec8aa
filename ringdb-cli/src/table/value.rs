//! Cell value representation for workbook datasets

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single cell in a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Empty cell
    Null,
    /// Text
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point (distances, coordinates)
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time (spreadsheet dates)
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, or a string holding only whitespace
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as a number, accepting numeric text such as "1,250.5"
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            Value::String(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok()
            }
            _ => None,
        }
    }

    /// Identifier form of the value, used to compare site and ring IDs.
    ///
    /// Whole floats are rendered without a fraction so that a numeric
    /// cell `1001.0` and a text cell `"1001"` compare equal.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => Some(format_float(*f)),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(dt) => Some(dt.to_string()),
        }
    }

    /// Lower-cased key with all spaces removed ("Insert Site" -> "insertsite")
    pub fn tag(&self) -> Option<String> {
        self.key()
            .map(|k| k.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// Check whether the value's tag equals the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag().as_deref() == Some(tag)
    }

    /// Return `self` unless empty, otherwise the fallback
    pub fn or(self, fallback: Value) -> Value {
        if self.is_empty() { fallback } else { self }
    }
}

/// Render a float the way identifiers and headers expect it
pub(crate) fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", format_float(*fl)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
