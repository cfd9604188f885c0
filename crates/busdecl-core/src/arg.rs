//! Typed arguments of methods and signals.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{
    element::{ElementKind, ElementNode},
    error::DeclarationError,
};

/// Name given to the implicit argument created for a declared response type.
pub const RESPONSE_ARG_NAME: &str = "response";

/// Whether an argument flows into or out of the callee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(DeclarationError::InvalidDirection(other.to_string())),
        }
    }
}

/// An argument element: name, type signature and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    name: String,
    signature: String,
    direction: Direction,
}

impl Arg {
    /// Creates an input argument.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::MissingSignature`] if `signature` is empty.
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Result<Self, DeclarationError> {
        Self::with_direction(name, signature, Direction::In)
    }

    pub fn with_direction(
        name: impl Into<String>,
        signature: impl Into<String>,
        direction: Direction,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();
        let signature = signature.into();
        if signature.is_empty() {
            return Err(DeclarationError::MissingSignature { arg: name });
        }
        Ok(Self {
            name,
            signature,
            direction,
        })
    }

    /// Creates the implicit output argument named `response`.
    pub fn response(signature: impl Into<String>) -> Result<Self, DeclarationError> {
        Self::with_direction(RESPONSE_ARG_NAME, signature, Direction::Out)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn to_element(&self) -> ElementNode {
        ElementNode::new(ElementKind::Arg)
            .with_attribute("name", self.name.as_str())
            .with_attribute("type_", self.signature.as_str())
            .with_attribute("direction", self.direction.as_str())
    }
}
