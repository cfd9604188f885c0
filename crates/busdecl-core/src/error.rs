//! Declaration-time errors.
//!
//! Every failure in this module is raised while an interface is being
//! declared. None of them are retried: a declaration that fails here is a
//! programming error in the declaring code.

use thiserror::Error;

use crate::element::ElementKind;

/// Errors raised while building introspection elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("argument `{arg}` needs a type signature")]
    MissingSignature { arg: String },

    #[error("{kind} needs a non-empty name")]
    EmptyName { kind: ElementKind },

    #[error("annotation `{name}` does not accept `{value}`; expected one of: {allowed}")]
    InvalidAnnotationValue {
        name: String,
        value: String,
        allowed: String,
    },

    #[error(
        "annotation `{name}` has no default value; either pass a valid value or declare a default"
    )]
    MissingAnnotationValue { name: String },

    #[error("{child} is not a valid child of a {parent}")]
    InvalidChild {
        parent: ElementKind,
        child: ElementKind,
    },

    #[error("annotation `{name}` on `{member}` conflicts with one the declaration adds itself")]
    ConflictingAnnotation { name: String, member: String },

    #[error("`{0}` is not a valid access mode (expected read, write or readwrite)")]
    InvalidAccess(String),

    #[error("`{0}` is not a valid argument direction (expected in or out)")]
    InvalidDirection(String),
}
