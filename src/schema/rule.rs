//! Compiled validation rules.

use crate::core::{Document, Value};
use crate::error::{ConfigError, Result, ValidationError};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A named validation callback.
///
/// Receives the raw value found at the rule's path.
pub type Handler = Arc<dyn Fn(&Value) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// Compiled rules keyed by dotted path.
pub type RuleSet = BTreeMap<String, Rule>;

/// The type a rule requires the value at its path to be readable as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// Any present value.
    String,
    /// `bool`.
    Bool,
    /// `int32`.
    Int32,
    /// `uint32`.
    UInt32,
    /// `int64`.
    Int64,
    /// `uint64`.
    UInt64,
    /// `float32`.
    Float32,
    /// `float64`.
    Float64,
    /// `array`, `list` or `slice`: a list with elements of any type.
    Array,
    /// `map` or `json`: a nested object.
    Map,
    /// `duration`: a whole number of seconds.
    Duration,
}

impl RuleType {
    /// Canonical schema name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Array => "array",
            Self::Map => "map",
            Self::Duration => "duration",
        }
    }

    /// Returns true when the value at `path` can be read as this type.
    pub fn matches(self, document: &Document, path: &str) -> bool {
        match self {
            Self::String => document.is_string(path),
            Self::Bool => document.is_bool(path),
            Self::Int32 => document.is_int32(path),
            Self::UInt32 => document.is_uint32(path),
            Self::Int64 => document.is_int64(path),
            Self::UInt64 => document.is_uint64(path),
            Self::Float32 => document.is_float32(path),
            Self::Float64 => document.is_float64(path),
            Self::Array => document.is_slice(path),
            Self::Map => document.is_map(path),
            Self::Duration => document.is_duration(path),
        }
    }
}

impl FromStr for RuleType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "bool" => Ok(Self::Bool),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::UInt32),
            "int64" => Ok(Self::Int64),
            "uint64" => Ok(Self::UInt64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "array" | "list" | "slice" => Ok(Self::Array),
            "map" | "json" => Ok(Self::Map),
            "duration" => Ok(Self::Duration),
            _ => Err(ConfigError::UnexpectedType(format!(
                "can't parse type `{}`",
                s
            ))),
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table of validation callbacks that schemas refer to by name.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::error::ValidationError;
/// use hotswap_json::schema::Handlers;
///
/// let handlers = Handlers::new().with("positive", |value| match value.to_i64() {
///     Some(n) if n > 0 => Ok(()),
///     _ => Err(ValidationError::custom("must be a positive integer")),
/// });
/// assert!(handlers.get("positive").is_some());
/// ```
#[derive(Clone, Default)]
pub struct Handlers {
    binds: HashMap<String, Handler>,
}

impl Handlers {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler under `name`, replacing any previous one.
    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.insert(name, handler);
        self
    }

    /// Add a handler under `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.binds.insert(name.into(), Arc::new(handler));
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.binds.get(name)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.binds.len()
    }

    /// Returns true when no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.binds.keys()).finish()
    }
}

/// A single compiled rule.
#[derive(Clone)]
pub struct Rule {
    required: bool,
    kind: RuleType,
    pattern: Option<Regex>,
    handler: Option<(String, Handler)>,
}

impl Rule {
    pub(crate) fn new(
        required: bool,
        kind: RuleType,
        pattern: Option<Regex>,
        handler: Option<(String, Handler)>,
    ) -> Self {
        Self {
            required,
            kind,
            pattern,
            handler,
        }
    }

    /// Whether the path must be present.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The declared type.
    pub fn kind(&self) -> RuleType {
        self.kind
    }

    /// Pattern the value's string form must match.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Name of the bound handler.
    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_ref().map(|(name, _)| name.as_str())
    }

    /// Check the value at `path`: presence, then type, then pattern, then handler.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`ConfigError::UnexpectedValue`].
    pub fn check(&self, document: &Document, path: &str) -> Result<()> {
        let Ok(value) = document.get(path) else {
            if self.required {
                return Err(ConfigError::UnexpectedValue(format!(
                    "path `{}` isn't set but `required`",
                    path
                )));
            }
            return Ok(());
        };

        if !self.kind.matches(document, path) {
            return Err(ConfigError::UnexpectedValue(format!(
                "path `{}` has wrong `type`, expected {}",
                path, self.kind
            )));
        }

        if let Some(pattern) = &self.pattern {
            let text = document.string(path).map_err(|_| {
                ConfigError::UnexpectedValue(format!("path `{}` has wrong `type`", path))
            })?;
            if !pattern.is_match(&text) {
                return Err(ConfigError::UnexpectedValue(format!(
                    "path `{}` has wrong value by `regexp`",
                    path
                )));
            }
        }

        if let Some((name, handler)) = &self.handler {
            handler(value).map_err(|e| {
                ConfigError::UnexpectedValue(format!(
                    "path `{}` has wrong value by `handler` `{}`: {}",
                    path, name, e
                ))
            })?;
        }

        Ok(())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("handler", &self.handler_name())
            .finish()
    }
}
