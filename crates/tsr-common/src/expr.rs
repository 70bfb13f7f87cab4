//! Verbatim expressions carried through the reflection pipeline.
//!
//! The reflector never evaluates host expressions. Property initializers,
//! parameter defaults and the symbolic names of referenced types are captured
//! as `Expr` values and reproduced unchanged in the generated literal.
//!
//! The host lowers whatever syntax it has into one of these shapes and the
//! printer emits them as JavaScript.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ScopeId;

/// A pre-built expression reproduced verbatim in generated output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    /// Identifier bound to a lexical scope: `Foo`
    Identifier {
        name: String,
        #[serde(default)]
        scope: ScopeId,
    },

    /// Host source text, emitted as-is: `new Map()`, `42`
    Source { text: String },

    /// Deferred expression: `() => body`
    Deferred { body: Box<Expr> },
}

impl Expr {
    /// Create an identifier bound to `scope`
    pub fn id(name: impl Into<String>, scope: ScopeId) -> Self {
        Self::Identifier {
            name: name.into(),
            scope,
        }
    }

    /// Create a verbatim source fragment
    pub fn source(text: impl Into<String>) -> Self {
        Self::Source { text: text.into() }
    }

    /// Wrap `body` in a zero-argument arrow so it is evaluated lazily
    pub fn deferred(body: Self) -> Self {
        Self::Deferred {
            body: Box::new(body),
        }
    }

    /// Name of an identifier expression.
    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    fn needs_parens_as_arrow_body(&self) -> bool {
        // An object literal body would otherwise parse as a block.
        match self {
            Self::Source { text } => text.trim_start().starts_with('{'),
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier { name, .. } => f.write_str(name),
            Self::Source { text } => f.write_str(text),
            Self::Deferred { body } => {
                if body.needs_parens_as_arrow_body() {
                    write!(f, "() => ({body})")
                } else {
                    write!(f, "() => {body}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_prints_as_arrow() {
        let expr = Expr::deferred(Expr::source("new Date()"));
        assert_eq!(expr.to_string(), "() => new Date()");
    }

    #[test]
    fn deferred_object_body_is_parenthesized() {
        let expr = Expr::deferred(Expr::source("{ a: 1 }"));
        assert_eq!(expr.to_string(), "() => ({ a: 1 })");
    }

    #[test]
    fn identifier_keeps_scope() {
        let expr = Expr::id("Recursive", ScopeId(3));
        assert_eq!(expr.identifier_name(), Some("Recursive"));
        assert_eq!(
            expr,
            Expr::Identifier {
                name: "Recursive".into(),
                scope: ScopeId(3)
            }
        );
    }

    #[test]
    fn deserializes_tagged_form() {
        let expr: Expr = serde_json::from_str(r#"{"kind":"source","text":"1 + 2"}"#).unwrap();
        assert_eq!(expr, Expr::source("1 + 2"));
    }
}
