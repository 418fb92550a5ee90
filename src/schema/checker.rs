//! Document validation against a compiled rule set.

use crate::core::Document;
use crate::error::{ConfigError, Result};
use crate::schema::compiler::compile;
use crate::schema::rule::{Handlers, RuleSet};

/// Validates documents against a compiled rule-schema.
///
/// The schema is compiled once in [`Checker::new`]; checking is read-only and
/// can run from any number of threads.
///
/// Checking stops at the first failing rule.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::core::Document;
/// use hotswap_json::schema::{Checker, Handlers};
///
/// let checker = Checker::new(
///     br#"{"port": {"required": true, "type": "int64", "regexp": "^[0-9]+$"}}"#,
///     &Handlers::new(),
/// )?;
///
/// assert!(checker.check(&r#"{"port": 8080}"#.parse::<Document>()?).is_ok());
/// assert!(checker.check(&r#"{"port": "abc"}"#.parse::<Document>()?).is_err());
/// # Ok::<(), hotswap_json::error::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    rules: RuleSet,
}

impl Checker {
    /// Compile a rule-schema given as JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnexpectedScheme`] if the bytes aren't JSON, and
    /// any compilation error described in [`compile`].
    pub fn new(schema: &[u8], handlers: &Handlers) -> Result<Self> {
        let schema: serde_json::Value = serde_json::from_slice(schema).map_err(|e| {
            ConfigError::UnexpectedScheme(format!(
                "can't read the scheme to check some configuration because {}",
                e
            ))
        })?;

        Self::from_json(&schema, handlers)
    }

    /// Compile a rule-schema that is already decoded.
    ///
    /// # Errors
    ///
    /// See [`compile`].
    pub fn from_json(schema: &serde_json::Value, handlers: &Handlers) -> Result<Self> {
        Ok(Self {
            rules: compile(schema, handlers)?,
        })
    }

    /// The compiled rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Check a document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnexpectedValue`] describing the first rule that fails.
    pub fn check(&self, document: &Document) -> Result<()> {
        for (path, rule) in &self.rules {
            rule.check(document, path)?;
        }

        Ok(())
    }

    /// Decode JSON bytes and check the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the bytes aren't a JSON object,
    /// otherwise as [`Checker::check`].
    pub fn check_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.check(&Document::from_slice(bytes)?)
    }
}
