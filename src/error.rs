//! Error types for hotswap-json.

use std::fmt;

/// Result type alias for hotswap-json operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading, querying or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The rule-schema document is not valid JSON or is not an object.
    #[error("Unexpected scheme: {0}")]
    UnexpectedScheme(String),

    /// A rule node in the schema is structurally malformed.
    #[error("Unexpected rule: {0}")]
    UnexpectedRule(String),

    /// An unknown type name, or a value that cannot be coerced to the requested type.
    #[error("Unexpected type: {0}")]
    UnexpectedType(String),

    /// A schema references a handler missing from the handler table.
    #[error("Unexpected handler: {0}")]
    UnexpectedHandler(String),

    /// A document failed validation against a rule set.
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    /// No value exists at the requested path.
    #[error("Path `{0}` isn't exist")]
    NotFound(String),

    /// Failed to load the configuration file.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// The configuration file is not a valid JSON object.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Returns true when the error reports a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true when the error reports a failed coercion or unknown type name.
    pub fn is_unexpected_type(&self) -> bool {
        matches!(self, Self::UnexpectedType(_))
    }

    pub(crate) fn unexpected_type(path: &str, expected: &str) -> Self {
        Self::UnexpectedType(format!(
            "path `{}` contains a value that can't be read as {}",
            path, expected
        ))
    }
}

/// Error returned by a validation handler.
///
/// Handlers bound into a [`Checker`](crate::schema::Checker) return this type;
/// the checker surfaces it as [`ConfigError::UnexpectedValue`] with the path attached.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(ConfigError::NotFound("a.b".into()).is_not_found());
        assert!(ConfigError::unexpected_type("a", "int64").is_unexpected_type());
        assert!(!ConfigError::UnexpectedValue("x".into()).is_not_found());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::invalid_field("port", "must be >= 1024");
        assert_eq!(err.to_string(), "Field 'port' is invalid: must be >= 1024");

        let err = ValidationError::custom("nope");
        assert_eq!(err.to_string(), "nope");
    }
}
