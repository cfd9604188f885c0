//! Interface members: methods, signals and properties.
//!
//! Each member is a namespaced [`ElementNode`] whose children are arguments
//! and annotations. Properties accept annotations only.

use std::{fmt, str::FromStr};

use log::trace;
use serde::Deserialize;

use crate::{
    annotation::Annotation,
    arg::Arg,
    element::{ElementKind, ElementNode},
    error::DeclarationError,
};

/// Access mode of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "readwrite" => Ok(Self::ReadWrite),
            other => Err(DeclarationError::InvalidAccess(other.to_string())),
        }
    }
}

/// A child that can be attached to a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChild {
    Arg(Arg),
    Annotation(Annotation),
}

impl MemberChild {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Arg(_) => ElementKind::Arg,
            Self::Annotation(_) => ElementKind::Annotation,
        }
    }

    fn to_element(&self) -> ElementNode {
        match self {
            Self::Arg(arg) => arg.to_element(),
            Self::Annotation(annotation) => annotation.to_element(),
        }
    }
}

impl From<Arg> for MemberChild {
    fn from(arg: Arg) -> Self {
        Self::Arg(arg)
    }
}

impl From<Annotation> for MemberChild {
    fn from(annotation: Annotation) -> Self {
        Self::Annotation(annotation)
    }
}

fn named_node(kind: ElementKind, name: &str) -> Result<ElementNode, DeclarationError> {
    if name.is_empty() {
        return Err(DeclarationError::EmptyName { kind });
    }
    Ok(ElementNode::new(kind).with_attribute("name", name))
}

/// A method element.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    namespace: String,
    node: ElementNode,
}

impl Method {
    pub fn new(namespace: impl Into<String>, name: &str) -> Result<Self, DeclarationError> {
        let namespace = namespace.into();
        trace!(namespace = namespace.as_str(), name; "Declaring method");
        Ok(Self {
            namespace,
            node: named_node(ElementKind::Method, name)?,
        })
    }

    /// Appends an argument or annotation.
    pub fn append(&mut self, child: impl Into<MemberChild>) {
        self.node.append(child.into().to_element());
    }

    pub fn name(&self) -> &str {
        self.node.name().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn element(&self) -> &ElementNode {
        &self.node
    }

    pub fn into_element(self) -> ElementNode {
        self.node
    }
}

/// A signal element.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    namespace: String,
    node: ElementNode,
}

impl Signal {
    pub fn new(namespace: impl Into<String>, name: &str) -> Result<Self, DeclarationError> {
        let namespace = namespace.into();
        trace!(namespace = namespace.as_str(), name; "Declaring signal");
        Ok(Self {
            namespace,
            node: named_node(ElementKind::Signal, name)?,
        })
    }

    pub fn append(&mut self, child: impl Into<MemberChild>) {
        self.node.append(child.into().to_element());
    }

    pub fn name(&self) -> &str {
        self.node.name().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn element(&self) -> &ElementNode {
        &self.node
    }

    pub fn into_element(self) -> ElementNode {
        self.node
    }
}

/// A property element.
///
/// # Example
///
/// ```
/// # use busdecl_core::{Access, Annotation, Arg, Property};
/// let mut count = Property::new("com.example.Svc", "Count", "i", Access::ReadWrite).unwrap();
/// count.append(Annotation::deprecated()).unwrap();
///
/// // Arguments are not valid property children.
/// assert!(count.append(Arg::new("x", "i").unwrap()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    namespace: String,
    access: Access,
    node: ElementNode,
}

impl Property {
    /// Creates a property element.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::MissingSignature`] if `signature` is empty
    /// and [`DeclarationError::EmptyName`] if `name` is empty.
    pub fn new(
        namespace: impl Into<String>,
        name: &str,
        signature: &str,
        access: Access,
    ) -> Result<Self, DeclarationError> {
        if signature.is_empty() {
            return Err(DeclarationError::MissingSignature {
                arg: name.to_string(),
            });
        }
        let namespace = namespace.into();
        trace!(namespace = namespace.as_str(), name, access = access.as_str(); "Declaring property");

        let node = named_node(ElementKind::Property, name)?
            .with_attribute("type_", signature)
            .with_attribute("access", access.as_str());
        Ok(Self {
            namespace,
            access,
            node,
        })
    }

    /// Appends an annotation.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::InvalidChild`] for anything but an annotation.
    pub fn append(&mut self, child: impl Into<MemberChild>) -> Result<(), DeclarationError> {
        let child = child.into();
        if !matches!(child, MemberChild::Annotation(_)) {
            return Err(DeclarationError::InvalidChild {
                parent: ElementKind::Property,
                child: child.kind(),
            });
        }
        self.node.append(child.to_element());
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.node.name().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn signature(&self) -> &str {
        self.node
            .attribute("type_")
            .and_then(|value| value.as_text())
            .unwrap_or_default()
    }

    pub fn element(&self) -> &ElementNode {
        &self.node
    }

    pub fn into_element(self) -> ElementNode {
        self.node
    }
}
