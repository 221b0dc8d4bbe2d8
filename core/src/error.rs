//! Error taxonomy for binding and token application.
//!
//! Binding-time errors are fail-fast and fail-atomic: a single offending
//! field invalidates the whole bind call and no partial registry is kept.
//! Token-application errors ([`BindError::InvalidValue`]) are attributed to
//! the specific field and token and leave the bound value untouched.

use thiserror::Error;

/// Errors raised while binding a struct or applying tokens to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The binding annotation violates the tag grammar (e.g. a multi-letter
    /// shorthand).
    #[error("malformed binding annotation for field {field:?}: {reason} (tag {tag:?})")]
    MalformedAnnotation {
        /// Field whose annotation failed to parse.
        field: String,
        /// Offending annotation string.
        tag: String,
        /// Human-readable description of the violation.
        reason: String,
    },
    /// A nested binding group the walker must descend into is absent.
    #[error("inner structure not initialized: {field}")]
    UninitializedNesting {
        /// Name of the absent nested group.
        field: String,
    },
    /// No dispatcher branch matches the field's value type.
    #[error("unsupported type for field {field}: {detail}")]
    UnsupportedType {
        /// Field that could not be bound.
        field: String,
        /// Why dispatch failed.
        detail: String,
    },
    /// Two flags share the same name.
    #[error("duplicate flag: {name}")]
    DuplicateName {
        /// The colliding flag name.
        name: String,
    },
    /// Two flags share the same non-empty shorthand.
    #[error("duplicate shorthand {shorthand:?} for flags {first} and {second}")]
    DuplicateShorthand {
        /// The colliding shorthand letter.
        shorthand: String,
        /// First flag carrying the shorthand (name order).
        first: String,
        /// Second flag carrying the shorthand.
        second: String,
    },
    /// The positional-argument order annotations are inconsistent.
    #[error("invalid positional ordering for {field}: {reason}")]
    InvalidOrdering {
        /// Positional argument whose order is invalid.
        field: String,
        /// Which ordering invariant was violated.
        reason: String,
    },
    /// Lookup of a name that was never registered. Non-fatal: the caller
    /// decides how to react.
    #[error("flag {name} is not bound")]
    NotBound {
        /// The name that was looked up.
        name: String,
    },
    /// A command-line token could not be parsed into the field's value type.
    #[error("invalid value {token:?} for {field}: {source}")]
    InvalidValue {
        /// Field the token was applied to.
        field: String,
        /// The offending token.
        token: String,
        /// The underlying parse failure.
        source: ValueError,
    },
}

impl BindError {
    pub(crate) fn unsupported(field: &str, detail: impl Into<String>) -> Self {
        BindError::UnsupportedType {
            field: field.to_string(),
            detail: detail.into(),
        }
    }
}

/// A single token failed to parse into a value of the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} literal: {token:?}")]
pub struct ValueError {
    /// Value kind that was expected (e.g. `"bool"`, `"int64"`).
    pub kind: &'static str,
    /// The token that failed to parse.
    pub token: String,
}

impl ValueError {
    /// Creates a parse error for the given value kind and token.
    pub fn invalid(kind: &'static str, token: &str) -> Self {
        ValueError {
            kind,
            token: token.to_string(),
        }
    }
}
