//! Value kinds a rule chain can be typed over

use crate::value::Value;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::Value as JsonValue;

/// How a chain turns a dynamic [`Value`] into the type its rules test.
pub trait ValueKind: Send + Sync + 'static {
    type Target: Send + Sync + 'static;

    /// Name used in type mismatch faults
    const NAME: &'static str;

    /// `None` when the value cannot be represented by this kind
    fn coerce(value: &Value) -> Option<Self::Target>;

    /// Whether a non-null value counts as present for required/optional checks
    fn is_present(_target: &Self::Target) -> bool {
        true
    }

    /// Message argument form of a target value
    fn to_arg(target: &Self::Target) -> JsonValue;

    /// Human readable form used inside default messages
    fn describe(target: &Self::Target) -> String;
}

/// Kinds that support `min`, `max` and `range`
pub trait NumericKind: ValueKind {
    const CODE_PREFIX: &'static str;
}

/// Kinds that support past/future and before/after comparisons
pub trait TemporalKind: ValueKind {
    fn now() -> Self::Target;
}

/// Strings. Blank strings are not present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl ValueKind for Text {
    type Target = String;
    const NAME: &'static str = "text";

    fn coerce(value: &Value) -> Option<String> {
        value.as_str().map(str::to_string)
    }

    fn is_present(target: &String) -> bool {
        !target.trim().is_empty()
    }

    fn to_arg(target: &String) -> JsonValue {
        JsonValue::String(target.clone())
    }

    fn describe(target: &String) -> String {
        target.clone()
    }
}

/// Whole numbers; floating values are truncated
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl ValueKind for Integer {
    type Target = i64;
    const NAME: &'static str = "integer";

    fn coerce(value: &Value) -> Option<i64> {
        match value {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }

    fn to_arg(target: &i64) -> JsonValue {
        JsonValue::from(*target)
    }

    fn describe(target: &i64) -> String {
        target.to_string()
    }
}

impl NumericKind for Integer {
    const CODE_PREFIX: &'static str = "validator.integer";
}

/// Floating point numbers; integers are widened
#[derive(Debug, Clone, Copy, Default)]
pub struct Float;

impl ValueKind for Float {
    type Target = f64;
    const NAME: &'static str = "float";

    fn coerce(value: &Value) -> Option<f64> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn to_arg(target: &f64) -> JsonValue {
        serde_json::Number::from_f64(*target)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }

    fn describe(target: &f64) -> String {
        target.to_string()
    }
}

impl NumericKind for Float {
    const CODE_PREFIX: &'static str = "validator.float";
}

/// Instants in UTC; plain dates are read as midnight
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTime;

impl ValueKind for DateTime {
    type Target = chrono::DateTime<Utc>;
    const NAME: &'static str = "datetime";

    fn coerce(value: &Value) -> Option<Self::Target> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN).and_utc()),
            _ => None,
        }
    }

    fn to_arg(target: &Self::Target) -> JsonValue {
        JsonValue::String(target.to_rfc3339())
    }

    fn describe(target: &Self::Target) -> String {
        target.to_rfc3339()
    }
}

impl TemporalKind for DateTime {
    fn now() -> Self::Target {
        Utc::now()
    }
}

/// Calendar dates; instants keep only their UTC date
#[derive(Debug, Clone, Copy, Default)]
pub struct Date;

impl ValueKind for Date {
    type Target = NaiveDate;
    const NAME: &'static str = "date";

    fn coerce(value: &Value) -> Option<NaiveDate> {
        match value {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    fn to_arg(target: &NaiveDate) -> JsonValue {
        JsonValue::String(target.to_string())
    }

    fn describe(target: &NaiveDate) -> String {
        target.to_string()
    }
}

impl TemporalKind for Date {
    fn now() -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Any value, untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Dynamic;

impl ValueKind for Dynamic {
    type Target = Value;
    const NAME: &'static str = "value";

    fn coerce(value: &Value) -> Option<Value> {
        Some(value.clone())
    }

    fn to_arg(target: &Value) -> JsonValue {
        target.to_json()
    }

    fn describe(target: &Value) -> String {
        match target.to_json() {
            JsonValue::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blank_is_not_present() {
        assert!(!Text::is_present(&"   ".to_string()));
        assert!(Text::is_present(&" a ".to_string()));
        assert_eq!(Text::coerce(&Value::Integer(1)), None);
    }

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(Integer::coerce(&Value::Float(18.9)), Some(18));
        assert_eq!(Integer::coerce(&Value::Float(f64::NAN)), None);
        assert_eq!(Float::coerce(&Value::Integer(3)), Some(3.0));
        assert_eq!(Float::coerce(&Value::from("3")), None);
    }

    #[test]
    fn test_temporal_coercions() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 17).unwrap();
        let midnight = DateTime::coerce(&Value::Date(date)).unwrap();
        assert_eq!(midnight.date_naive(), date);
        assert_eq!(Date::coerce(&Value::DateTime(midnight)), Some(date));
        assert!(Date::now() <= Utc::now().date_naive());
    }

    #[test]
    fn test_dynamic_describes_strings_unquoted() {
        assert_eq!(Dynamic::describe(&Value::from("red")), "red");
        assert_eq!(Dynamic::describe(&Value::Integer(7)), "7");
    }
}
