//! Property paths and the dynamic value model read from inspected objects

use crate::error::{Result, ValidatorError};
use crate::introspect::{Bean, Introspect};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Dot-separated path of property names, e.g. `address.city`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    raw: String,
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a path, rejecting empty paths and empty or blank segments
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(ValidatorError::invalid_argument("Property path must not be empty"));
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(ValidatorError::invalid_argument(format!(
                    "Property path '{}' contains an empty segment",
                    raw
                )));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(ValidatorError::invalid_argument(format!(
                    "Property path '{}' contains whitespace in segment '{}'",
                    raw, segment
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Path segments, never empty
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of segments, always at least one
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// More than one segment
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PropertyPath {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = ValidatorError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for PropertyPath {
    type Error = ValidatorError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.raw
    }
}

impl PartialEq<&str> for PropertyPath {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}

impl PartialEq<str> for PropertyPath {
    fn eq(&self, other: &str) -> bool {
        self.raw == other
    }
}

/// A property value as seen by rule chains.
///
/// `Object` holds a nested inspectable object so paths can descend into it.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    List(Vec<Value>),
    Object(Arc<dyn Bean>),
}

impl Value {
    /// Wrap an inspectable object
    pub fn object<T: Introspect>(target: T) -> Self {
        Value::Object(Arc::new(target))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in type mismatch faults
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "text",
            Value::DateTime(_) => "datetime",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The inspectable object behind an `Object` value
    pub fn as_object(&self) -> Option<&Arc<dyn Bean>> {
        match self {
            Value::Object(bean) => Some(bean),
            _ => None,
        }
    }

    /// JSON rendering used for message arguments
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(bean) => serde_json::Value::String(format!("<{}>", bean.type_name())),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(bean) => f.debug_tuple("Object").field(&bean.type_name()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(value as i64)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Value::Integer)
            .unwrap_or(Value::Float(value as f64))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value.and_utc())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Introspect> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Value::Object(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(Arc::new(map)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_path() {
        let path = PropertyPath::parse("address.city").unwrap();
        assert_eq!(path.segments(), &["address".to_string(), "city".to_string()]);
        assert!(path.is_nested());
        assert_eq!(path.len(), 2);
        assert_eq!(path, "address.city");
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for raw in ["", ".", "a..b", "address.", ".city", "first name"] {
            let err = PropertyPath::parse(raw).unwrap_err();
            assert!(err.is_invalid_argument(), "expected rejection for {:?}", raw);
        }
    }

    #[test]
    fn test_path_serde_uses_raw_string() {
        let path: PropertyPath = serde_json::from_str("\"a.b.c\"").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"a.b.c\"");
        assert!(serde_json::from_str::<PropertyPath>("\"a..c\"").is_err());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(42u8), Value::Integer(42));
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(Value::from(u64::MAX).kind_name(), "float");
    }

    #[test]
    fn test_json_object_becomes_inspectable() {
        let value = Value::from(serde_json::json!({"name": "Ada"}));
        assert_eq!(value.kind_name(), "object");
        assert!(value.as_object().is_some());
    }

    #[test]
    fn test_to_json_renders_dates_as_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::from(date).to_json(), serde_json::json!("2024-02-29"));
        assert_eq!(Value::from(1.5).to_json(), serde_json::json!(1.5));
    }
}
