//! Compiles a JSON rule-tree into a flat [`RuleSet`].
//!
//! A node carrying a `required` key is a rule for its own path. Once the rule
//! keys are stripped, any keys left on the node are compiled as child rules
//! under `node.child`, so one node can be both a rule and a namespace.

use crate::core::path;
use crate::error::{ConfigError, Result};
use crate::schema::rule::{Handlers, Rule, RuleSet, RuleType};
use regex::Regex;
use serde_json::{Map, Value};

/// Keys that describe a rule rather than a path segment.
const RULE_KEYS: [&str; 5] = ["required", "type", "regexp", "pattern", "handler"];

fn is_rule_key(key: &str) -> bool {
    RULE_KEYS.contains(&key)
}

/// Compile a rule-schema document.
///
/// # Errors
///
/// - [`ConfigError::UnexpectedScheme`] if the root isn't an object
/// - [`ConfigError::UnexpectedRule`] for malformed nodes or patterns
/// - [`ConfigError::UnexpectedType`] for unknown type names
/// - [`ConfigError::UnexpectedHandler`] for handler names missing from `handlers`
pub fn compile(schema: &Value, handlers: &Handlers) -> Result<RuleSet> {
    let root = schema.as_object().ok_or_else(|| {
        ConfigError::UnexpectedScheme(format!(
            "the scheme root must be a JSON object, got `{}`",
            schema
        ))
    })?;

    walk(root, false, handlers)
}

fn walk(node: &Map<String, Value>, skip_rule_keys: bool, handlers: &Handlers) -> Result<RuleSet> {
    let mut set = RuleSet::new();

    for (name, value) in node {
        if skip_rule_keys && is_rule_key(name) {
            continue;
        }

        let child = value.as_object().ok_or_else(|| {
            ConfigError::UnexpectedRule(format!("can't parse scheme `{}` at `{}`", value, name))
        })?;
        let key = path::escape_segment(name);

        if child.contains_key("required") {
            set.insert(key.to_string(), parse_rule(child, handlers)?);
        }

        if child.keys().any(|k| !is_rule_key(k)) {
            for (sub_path, rule) in walk(child, true, handlers)? {
                set.insert(path::join(&key, &sub_path), rule);
            }
        }
    }

    Ok(set)
}

fn parse_rule(node: &Map<String, Value>, handlers: &Handlers) -> Result<Rule> {
    let malformed = |reason: &str| {
        ConfigError::UnexpectedRule(format!(
            "can't parse rule `{}` because {}",
            Value::Object(node.clone()),
            reason
        ))
    };

    let required = match node.get("required") {
        Some(Value::Bool(required)) => *required,
        Some(_) => return Err(malformed("of wrong `required`")),
        None => return Err(malformed("`required` is absent")),
    };

    let kind = match node.get("type") {
        Some(Value::String(name)) => name.parse::<RuleType>()?,
        Some(_) => return Err(malformed("of wrong `type`")),
        None => return Err(malformed("`type` is absent")),
    };

    let pattern = match (node.get("regexp"), node.get("pattern")) {
        (Some(_), Some(_)) => return Err(malformed("both `regexp` and `pattern` are set")),
        (Some(Value::String(source)), None) | (None, Some(Value::String(source))) => Some(
            Regex::new(source).map_err(|_| malformed("`regexp` can't be compiled"))?,
        ),
        (None, None) => None,
        _ => return Err(malformed("of wrong `regexp`")),
    };

    let handler = match node.get("handler") {
        Some(Value::String(name)) => {
            let handler = handlers.get(name).ok_or_else(|| {
                ConfigError::UnexpectedHandler(format!(
                    "can't parse handler `{}` because it isn't present in the checker",
                    name
                ))
            })?;
            Some((name.clone(), handler.clone()))
        }
        Some(_) => return Err(malformed("of wrong `handler`")),
        None => None,
    };

    Ok(Rule::new(required, kind, pattern, handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    fn compile_json(schema: Value) -> Result<RuleSet> {
        compile(&schema, &Handlers::new())
    }

    #[test]
    fn test_flat_rules() {
        let set = compile_json(json!({
            "port": {"required": true, "type": "int64", "regexp": "^[0-9]+$"},
            "host": {"required": false, "type": "string"}
        }))
        .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set["port"].required());
        assert_eq!(set["port"].kind(), RuleType::Int64);
        assert_eq!(set["port"].pattern().unwrap().as_str(), "^[0-9]+$");
        assert!(!set["host"].required());
    }

    #[test]
    fn test_nested_namespaces() {
        let set = compile_json(json!({
            "server": {
                "http": {"port": {"required": true, "type": "uint32"}},
                "name": {"required": false, "type": "string"}
            }
        }))
        .unwrap();

        let paths: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["server.http.port", "server.name"]);
    }

    #[test]
    fn test_node_is_rule_and_namespace() {
        let set = compile_json(json!({
            "db": {
                "required": true,
                "type": "map",
                "url": {"required": true, "type": "string"}
            }
        }))
        .unwrap();

        assert_eq!(set["db"].kind(), RuleType::Map);
        assert_eq!(set["db.url"].kind(), RuleType::String);
        assert!(!set.keys().any(|k| k.ends_with(".type") || k.ends_with(".required")));
    }

    #[test]
    fn test_root_level_reserved_names_are_paths() {
        let set = compile_json(json!({
            "type": {"required": true, "type": "string"}
        }))
        .unwrap();
        assert!(set.contains_key("type"));
    }

    #[test]
    fn test_dotted_keys_are_escaped() {
        let set = compile_json(json!({
            "hosts": {"db.primary": {"required": true, "type": "string"}}
        }))
        .unwrap();
        assert!(set.contains_key(r"hosts.db\.primary"));
    }

    #[test]
    fn test_unknown_type() {
        let err = compile_json(json!({"port": {"required": true, "type": "wat"}})).unwrap_err();
        assert!(err.is_unexpected_type());
    }

    #[test]
    fn test_malformed_rules() {
        let cases = [
            json!({"port": {"required": "yes", "type": "int64"}}),
            json!({"port": {"required": true}}),
            json!({"port": {"required": true, "type": 5}}),
            json!({"port": {"required": true, "type": "string", "regexp": "("}}),
            json!({"port": {"required": true, "type": "string", "regexp": 1}}),
            json!({"port": {"required": true, "type": "string", "handler": false}}),
            json!({"port": 5}),
        ];

        for schema in cases {
            let err = compile_json(schema.clone()).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnexpectedRule(_)),
                "{} -> {:?}",
                schema,
                err
            );
        }
    }

    #[test]
    fn test_non_object_root() {
        assert!(matches!(
            compile_json(json!([1, 2])),
            Err(ConfigError::UnexpectedScheme(_))
        ));
    }

    #[test]
    fn test_handlers_resolved() {
        let handlers = Handlers::new().with("any", |_| Ok::<(), ValidationError>(()));
        let schema = json!({"a": {"required": true, "type": "string", "handler": "any"}});
        let set = compile(&schema, &handlers).unwrap();
        assert_eq!(set["a"].handler_name(), Some("any"));

        let schema = json!({"a": {"required": true, "type": "string", "handler": "missing"}});
        assert!(matches!(
            compile(&schema, &handlers),
            Err(ConfigError::UnexpectedHandler(_))
        ));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let schema = json!({
            "a": {"required": true, "type": "int32", "b": {"required": false, "type": "bool"}}
        });
        let first: Vec<String> = compile_json(schema.clone()).unwrap().into_keys().collect();
        let second: Vec<String> = compile_json(schema).unwrap().into_keys().collect();
        assert_eq!(first, second);
    }
}
