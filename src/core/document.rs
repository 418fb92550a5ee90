//! Path-addressed access to a decoded JSON object.

use crate::core::path;
use crate::core::value::{Map, Value};
use crate::error::{ConfigError, Result};
use std::str::FromStr;
use std::time::Duration;

/// A decoded configuration document.
///
/// Every read takes a dotted path (see [`path`](crate::core::path)) and fails with
/// [`ConfigError::NotFound`] when a segment is missing, or with
/// [`ConfigError::UnexpectedType`] when the value can't be coerced to the
/// requested type. The `is_*` predicates report whether the matching reader
/// would succeed.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::core::Document;
///
/// let doc = Document::from_slice(br#"{"server": {"port": "8080", "debug": true}}"#)?;
/// assert_eq!(doc.int64("server.port")?, 8080);
/// assert!(doc.bool("server.debug")?);
/// assert!(!doc.exists("server.host"));
/// # Ok::<(), hotswap_json::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Map,
}

macro_rules! typed_reader {
    ($name:ident, $is:ident, $ty:ty, $label:literal, $coerce:ident) => {
        #[doc = concat!("Read the value at `path` as ", $label, ".")]
        pub fn $name(&self, path: &str) -> Result<$ty> {
            self.get(path)?
                .$coerce()
                .ok_or_else(|| ConfigError::unexpected_type(path, $label))
        }

        #[doc = concat!("Returns true when the value at `path` can be read as ", $label, ".")]
        pub fn $is(&self, path: &str) -> bool {
            self.$name(path).is_ok()
        }
    };
}

impl Document {
    /// Wrap an already decoded root object.
    pub fn new(root: Map) -> Self {
        Self { root }
    }

    /// Decode a document from JSON bytes. The root must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the bytes aren't JSON or the
    /// root isn't an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::from_json(value)
    }

    /// Wrap a generic JSON value. The value must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the value isn't an object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match Value::from(value) {
            Value::Map(root) => Ok(Self { root }),
            other => Err(ConfigError::ParseError(format!(
                "expected a JSON object at the root, got {}",
                other.type_name()
            ))),
        }
    }

    /// Borrow the root object.
    pub fn root(&self) -> &Map {
        &self.root
    }

    /// Consume the document and return its root object.
    pub fn into_root(self) -> Map {
        self.root
    }

    /// Borrow the raw value at `path`.
    ///
    /// A non-final segment holding anything other than an object counts as a
    /// missing path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when any segment is absent.
    pub fn get(&self, path: &str) -> Result<&Value> {
        let segments = path::segments(path);
        let not_found = || ConfigError::NotFound(path.to_string());

        let Some((last, parents)) = segments.split_last() else {
            return Err(not_found());
        };

        let mut current = &self.root;
        for segment in parents {
            match current.get(segment.as_ref()) {
                Some(Value::Map(nested)) => current = nested,
                _ => return Err(not_found()),
            }
        }

        current.get(last.as_ref()).ok_or_else(not_found)
    }

    /// Returns true when every segment of `path` is present.
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Render the value at `path` as a string.
    ///
    /// Any present value renders; see [`Value`]'s `Display` implementation.
    pub fn string(&self, path: &str) -> Result<String> {
        self.get(path).map(Value::to_string)
    }

    /// Returns true when a value exists at `path`; every value renders as a string.
    pub fn is_string(&self, path: &str) -> bool {
        self.string(path).is_ok()
    }

    typed_reader!(bool, is_bool, bool, "a bool", to_bool);
    typed_reader!(int32, is_int32, i32, "an int32", to_i32);
    typed_reader!(uint32, is_uint32, u32, "a uint32", to_u32);
    typed_reader!(int64, is_int64, i64, "an int64", to_i64);
    typed_reader!(uint64, is_uint64, u64, "a uint64", to_u64);
    typed_reader!(float32, is_float32, f32, "a float32", to_f32);
    typed_reader!(float64, is_float64, f64, "a float64", to_f64);
    typed_reader!(
        duration,
        is_duration,
        Duration,
        "a duration in seconds",
        to_duration
    );
    typed_reader!(list, is_list, Vec<String>, "a list of strings", to_string_list);

    /// Borrow the elements of the list at `path`; elements may be of any type.
    pub fn slice(&self, path: &str) -> Result<&[Value]> {
        self.get(path)?
            .as_slice()
            .ok_or_else(|| ConfigError::unexpected_type(path, "a list"))
    }

    /// Returns true when the value at `path` is a list.
    pub fn is_slice(&self, path: &str) -> bool {
        self.slice(path).is_ok()
    }

    /// Alias of [`Document::slice`].
    pub fn array(&self, path: &str) -> Result<&[Value]> {
        self.slice(path)
    }

    /// Borrow the object at `path`.
    pub fn map(&self, path: &str) -> Result<&Map> {
        self.get(path)?
            .as_map()
            .ok_or_else(|| ConfigError::unexpected_type(path, "an object"))
    }

    /// Returns true when the value at `path` is an object.
    pub fn is_map(&self, path: &str) -> bool {
        self.map(path).is_ok()
    }

    /// Alias of [`Document::map`].
    pub fn json(&self, path: &str) -> Result<&Map> {
        self.map(path)
    }
}

impl FromStr for Document {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

impl From<Map> for Document {
    fn from(root: Map) -> Self {
        Self::new(root)
    }
}
