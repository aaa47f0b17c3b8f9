//! Conservative literal evaluation of key expressions.
//!
//! Translation keys must be statically known for extraction to be sound, so
//! every grammar adapter lowers its parse tree into the closed [`LitExpr`]
//! algebra below and asks [`evaluate`] for the candidate strings. Anything
//! that is not a literal, a `+` concatenation, a conditional, or (for
//! directive arguments) an object literal is rejected with a reason instead
//! of guessed at.
//!
//! Branching expressions enumerate combinatorially:
//!
//! ```
//! use vintl::core::evaluate::{LitExpr, evaluate};
//!
//! // flag ? 'a' : 'b'  +  '.title'
//! let expr = LitExpr::concat(
//!     LitExpr::either(LitExpr::str("a"), LitExpr::str("b")),
//!     LitExpr::str(".title"),
//! );
//! assert_eq!(evaluate(&expr).unwrap(), vec!["a.title", "b.title"]);
//! ```

use thiserror::Error;

/// A key-argument expression reduced to the shapes the evaluator understands.
///
/// Each grammar adapter lowers its own parse tree into this enum with a
/// total match; node kinds with no counterpart here become [`LitExpr::Opaque`]
/// carrying a label for the warning message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LitExpr {
    /// A string literal with its decoded text.
    Str(String),
    /// Binary `+` concatenation.
    Concat(Box<LitExpr>, Box<LitExpr>),
    /// A conditional (`cond ? a : b`); the condition itself is irrelevant,
    /// both branches are candidates.
    Either(Box<LitExpr>, Box<LitExpr>),
    /// An object literal, for directive arguments like `v-t="{ path: 'k' }"`.
    /// Only properties with statically named keys are retained.
    Object(Vec<(String, LitExpr)>),
    /// Anything that cannot be statically evaluated, labeled by node kind
    /// (e.g. "identifier", "member expression", "template literal").
    Opaque(&'static str),
}

impl LitExpr {
    pub fn str(s: impl Into<String>) -> Self {
        LitExpr::Str(s.into())
    }

    pub fn concat(left: LitExpr, right: LitExpr) -> Self {
        LitExpr::Concat(Box::new(left), Box::new(right))
    }

    pub fn either(cons: LitExpr, alt: LitExpr) -> Self {
        LitExpr::Either(Box::new(cons), Box::new(alt))
    }
}

/// Why an expression could not be reduced to string values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression (or a sub-expression) is not statically determinable.
    /// Deliberate boundary: vintl never resolves variables.
    #[error("cannot extract key from {kind}, use a string literal")]
    NotStatic { kind: &'static str },

    /// A property path was requested but the object has no such property.
    #[error("no property '{path}' in object argument")]
    NoSuchProperty { path: String },

    /// A property path was requested on a non-object expression.
    #[error("cannot look up property '{path}' in a non-object argument")]
    NotAnObject { path: String },
}

/// Enumerate every string value `expr` can statically take.
///
/// Returns the values in deterministic order: concatenation is a cartesian
/// product (left-major), a conditional contributes its consequent's values
/// before its alternate's.
pub fn evaluate(expr: &LitExpr) -> Result<Vec<String>, EvalError> {
    match expr {
        LitExpr::Str(s) => Ok(vec![s.clone()]),

        LitExpr::Concat(left, right) => {
            let left_values = evaluate(left)?;
            let right_values = evaluate(right)?;
            let mut values = Vec::with_capacity(left_values.len() * right_values.len());
            for l in &left_values {
                for r in &right_values {
                    values.push(format!("{}{}", l, r));
                }
            }
            Ok(values)
        }

        LitExpr::Either(cons, alt) => {
            let mut values = evaluate(cons)?;
            values.extend(evaluate(alt)?);
            Ok(values)
        }

        // A bare object is not a key; it only makes sense under a property
        // path (see `evaluate_property`).
        LitExpr::Object(_) => Err(EvalError::NotStatic {
            kind: "object literal",
        }),

        LitExpr::Opaque(kind) => Err(EvalError::NotStatic { kind }),
    }
}

/// Evaluate `expr` under an optional property path.
///
/// An empty path evaluates the expression directly. A non-empty path
/// requires an object literal and evaluates the named property's value,
/// the lookup used for object-valued directives (`v-t="{ path: 'k' }"`
/// with paths `["", "path"]`).
pub fn evaluate_property(expr: &LitExpr, path: &str) -> Result<Vec<String>, EvalError> {
    if path.is_empty() {
        return evaluate(expr);
    }
    match expr {
        LitExpr::Object(props) => props
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, value)| evaluate(value))
            .unwrap_or_else(|| {
                Err(EvalError::NoSuchProperty {
                    path: path.to_string(),
                })
            }),
        _ => Err(EvalError::NotAnObject {
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_string_literal_evaluates_to_itself() {
        assert_eq!(
            evaluate(&LitExpr::str("greeting.hello")),
            Ok(vec!["greeting.hello".to_string()])
        );
    }

    #[test]
    fn test_concat_is_cartesian() {
        // ('a' ? : 'b') + '.x'  -> ["a.x", "b.x"] in that order
        let expr = LitExpr::concat(
            LitExpr::either(LitExpr::str("a"), LitExpr::str("b")),
            LitExpr::str(".x"),
        );
        assert_eq!(
            evaluate(&expr),
            Ok(vec!["a.x".to_string(), "b.x".to_string()])
        );
    }

    #[test]
    fn test_ternary_union_preserves_order() {
        let expr = LitExpr::either(LitExpr::str("first"), LitExpr::str("second"));
        assert_eq!(
            evaluate(&expr),
            Ok(vec!["first".to_string(), "second".to_string()])
        );
    }

    #[test]
    fn test_nested_branches_compose_combinatorially() {
        // (p ? 'a' : 'b') + (q ? '.x' : '.y') -> 4 candidates, left-major
        let expr = LitExpr::concat(
            LitExpr::either(LitExpr::str("a"), LitExpr::str("b")),
            LitExpr::either(LitExpr::str(".x"), LitExpr::str(".y")),
        );
        assert_eq!(
            evaluate(&expr),
            Ok(vec![
                "a.x".to_string(),
                "a.y".to_string(),
                "b.x".to_string(),
                "b.y".to_string(),
            ])
        );
    }

    #[test]
    fn test_opaque_fails_closed() {
        let err = evaluate(&LitExpr::Opaque("identifier")).unwrap_err();
        assert_eq!(err, EvalError::NotStatic { kind: "identifier" });
        assert!(err.to_string().contains("use a string literal"));
    }

    #[test]
    fn test_branch_with_opaque_side_fails() {
        let expr = LitExpr::either(LitExpr::str("ok"), LitExpr::Opaque("member expression"));
        assert!(evaluate(&expr).is_err());
    }

    #[test]
    fn test_property_lookup() {
        let expr = LitExpr::Object(vec![
            ("path".to_string(), LitExpr::str("msg.key")),
            ("args".to_string(), LitExpr::Opaque("object literal")),
        ]);
        assert_eq!(
            evaluate_property(&expr, "path"),
            Ok(vec!["msg.key".to_string()])
        );
    }

    #[test]
    fn test_property_lookup_missing() {
        let expr = LitExpr::Object(vec![]);
        assert_eq!(
            evaluate_property(&expr, "path"),
            Err(EvalError::NoSuchProperty {
                path: "path".to_string()
            })
        );
    }

    #[test]
    fn test_property_lookup_on_non_object() {
        assert_eq!(
            evaluate_property(&LitExpr::str("k"), "path"),
            Err(EvalError::NotAnObject {
                path: "path".to_string()
            })
        );
    }

    #[test]
    fn test_empty_path_evaluates_directly() {
        assert_eq!(
            evaluate_property(&LitExpr::str("direct"), ""),
            Ok(vec!["direct".to_string()])
        );
    }

    #[test]
    fn test_bare_object_is_not_a_key() {
        assert!(evaluate(&LitExpr::Object(vec![])).is_err());
    }
}
