//! Dynamically typed configuration values and their coercions.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A nested mapping from key to [`Value`].
pub type Map = BTreeMap<String, Value>;

/// A decoded JSON value.
///
/// Values keep the shape produced by the JSON decoder. Typed readers such as
/// [`Value::to_i64`] coerce on demand: numbers narrow or widen directly, and
/// strings holding numbers or booleans are parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// A JSON number that fits in an `i64`.
    Int(i64),
    /// A JSON integer above `i64::MAX` that fits in a `u64`.
    UInt(u64),
    /// Any other JSON number.
    Float(f64),
    /// JSON string.
    String(String),
    /// JSON array.
    List(Vec<Value>),
    /// JSON object.
    Map(Map),
}

macro_rules! integer_coercion {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self) -> Option<$ty> {
            match self {
                Self::Int(i) => Some(<$ty>::try_from(*i).unwrap_or(if *i < 0 {
                    <$ty>::MIN
                } else {
                    <$ty>::MAX
                })),
                Self::UInt(u) => Some(<$ty>::try_from(*u).unwrap_or(<$ty>::MAX)),
                Self::Float(f) => Some(*f as $ty),
                Self::String(s) => s
                    .parse::<$ty>()
                    .ok()
                    .or_else(|| parse_finite(s).map(|f| f as $ty)),
                _ => None,
            }
        }
    };
}

impl Value {
    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Read the value as a boolean.
    ///
    /// Strings are accepted in the forms `1 t T TRUE true True` and
    /// `0 f F FALSE false False`. Numbers are not booleans.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => parse_bool(s),
            _ => None,
        }
    }

    integer_coercion!(
        /// Read the value as an `i32`, truncating floats and saturating at the range bounds.
        to_i32,
        i32
    );
    integer_coercion!(
        /// Read the value as a `u32`, truncating floats and saturating at the range bounds.
        to_u32,
        u32
    );
    integer_coercion!(
        /// Read the value as an `i64`, truncating floats and saturating at the range bounds.
        to_i64,
        i64
    );
    integer_coercion!(
        /// Read the value as a `u64`, truncating floats and saturating at the range bounds.
        to_u64,
        u64
    );

    /// Read the value as an `f32`.
    pub fn to_f32(&self) -> Option<f32> {
        match self {
            Self::Int(i) => Some(*i as f32),
            Self::UInt(u) => Some(*u as f32),
            Self::Float(f) => Some(*f as f32),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Read the value as an `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Read the value as a whole number of seconds.
    pub fn to_duration(&self) -> Option<Duration> {
        self.to_i64()
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }

    /// Read a list whose elements are all strings.
    pub fn to_string_list(&self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Borrow the elements of a list.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow a nested mapping.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the contents of a string value without coercion.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Renders scalars the way they read in a config file; lists and maps render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::UInt(u) => write!(f, "{}", u),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Self::UInt(u), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from(json!(8080)), Value::Int(8080));
        assert_eq!(Value::from(json!(-1)), Value::Int(-1));
        assert_eq!(Value::from(json!(0.1)), Value::Float(0.1));
        assert_eq!(Value::from(json!(1e20)), Value::Float(1e20));
    }

    #[test]
    fn test_large_unsigned_stays_exact() {
        let value = Value::from(json!(18446744073709551614u64));
        assert_eq!(value, Value::UInt(18446744073709551614));
        assert_eq!(value.to_u64(), Some(18446744073709551614));
        assert_eq!(value.to_u64(), Value::from("18446744073709551614").to_u64());
        assert_eq!(value.to_string(), "18446744073709551614");
        assert_eq!(value.to_i64(), Some(i64::MAX));
        assert_eq!(value.to_u32(), Some(u32::MAX));

        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value.to_u64(), Some(u64::MAX));
        assert_eq!(Value::from(42u64), Value::Int(42));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(Value::Float(2.9).to_i64(), Some(2));
        assert_eq!(Value::Float(-2.9).to_i32(), Some(-2));
        assert_eq!(Value::from("42").to_u32(), Some(42));
        assert_eq!(Value::from("-1").to_i32(), Some(-1));
        assert_eq!(Value::from("8080.0").to_i64(), Some(8080));
        assert_eq!(Value::from("abc").to_i64(), None);
        assert_eq!(Value::Bool(true).to_i64(), None);
        assert_eq!(Value::Int(-1).to_u64(), Some(0));
        assert_eq!(Value::Int(i64::MAX).to_i32(), Some(i32::MAX));
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Value::Bool(false).to_bool(), Some(false));
        assert_eq!(Value::from("T").to_bool(), Some(true));
        assert_eq!(Value::from("0").to_bool(), Some(false));
        assert_eq!(Value::from("yes").to_bool(), None);
        assert_eq!(Value::Int(1).to_bool(), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Value::Int(3).to_f64(), Some(3.0));
        assert_eq!(Value::from("0.1").to_f64(), Some(0.1));
        assert_eq!(Value::from("0.1").to_f32(), Some(0.1f32));
        assert_eq!(Value::Null.to_f64(), None);
    }

    #[test]
    fn test_duration_coercion() {
        assert_eq!(Value::Int(5).to_duration(), Some(Duration::from_secs(5)));
        assert_eq!(Value::from("5").to_duration(), Some(Duration::from_secs(5)));
        assert_eq!(Value::Int(-5).to_duration(), None);
    }

    #[test]
    fn test_string_list() {
        let list = Value::from(json!(["one", "two"]));
        assert_eq!(
            list.to_string_list(),
            Some(vec!["one".to_string(), "two".to_string()])
        );

        let mixed = Value::from(json!(["one", 2]));
        assert_eq!(mixed.to_string_list(), None);
        assert_eq!(mixed.as_slice().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(5.0).to_string(), "5");
        assert_eq!(Value::Float(0.1).to_string(), "0.1");
        assert_eq!(Value::Int(-1).to_string(), "-1");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(json!(["a", 1])).to_string(), r#"["a",1]"#);
        assert_eq!(Value::from(json!({"k": "v"})).to_string(), r#"{"k":"v"}"#);
    }

    #[test]
    fn test_deserialize() {
        let value: Value = serde_json::from_str(r#"{"a": [1, "x", null]}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Int(1), Value::from("x"), Value::Null])
        );
    }
}
