//! Declarative schema validation.
//!
//! A schema is a JSON object mirroring the shape of the configuration. Leaf
//! nodes describe a rule with the keys `required` (bool), `type` (string),
//! an optional `regexp` (or `pattern`) and an optional `handler` name:
//!
//! ```json
//! {
//!     "server": {
//!         "port": {"required": true, "type": "uint32", "regexp": "^[0-9]+$"},
//!         "tls": {"required": false, "type": "map", "handler": "tls"}
//!     }
//! }
//! ```

mod checker;
mod compiler;
mod rule;

pub use checker::Checker;
pub use compiler::compile;
pub use rule::{Handler, Handlers, Rule, RuleSet, RuleType};
