//! Error types for Busdecl operations.
//!
//! This module provides the main error type [`BusdeclError`] which wraps the
//! declaration errors of `busdecl-core` and adds the failures that can only
//! happen once an interface is live: access-mode violations, missing
//! implementations and failing callbacks.

use std::io;

use thiserror::Error;

use busdecl_core::{Access, DeclarationError};

/// Boxed error returned by user-supplied callbacks and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for Busdecl operations.
#[derive(Debug, Error)]
pub enum BusdeclError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error("property `{property}` is {access}; {operation} is not permitted")]
    AccessViolation {
        property: String,
        access: Access,
        operation: &'static str,
    },

    #[error("`{0}` requires an implementation according to its introspection signature")]
    NotImplemented(String),

    #[error("`{0}` is set by the introspector and must not be passed to the constructor")]
    ReservedKeyword(String),

    #[error("{kind} `{name}` is declared more than once")]
    DuplicateMember { kind: &'static str, name: String },

    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    #[error("unknown signal `{0}`")]
    UnknownSignal(String),

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("subscriber of `{signal}` failed: {source}")]
    Subscriber {
        signal: String,
        #[source]
        source: BoxError,
    },

    #[error("handler of `{member}` failed: {source}")]
    Handler {
        member: String,
        #[source]
        source: BoxError,
    },

    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
