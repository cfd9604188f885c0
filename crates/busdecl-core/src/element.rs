//! Generic introspection element tree.
//!
//! Every declared entity (interface, method, property, signal, argument,
//! annotation) is an [`ElementNode`]: a labeled node with an ordered attribute
//! map and an ordered list of children. A child is either a single node or an
//! [`ElementNodeGroup`], which lets one declaration emit several peer elements.
//!
//! # Serialization
//!
//! [`ElementNode::serialize`] produces a [`Fragment`]. Attribute normalization
//! happens at that point, not at construction, so mutations performed after a
//! node was built are visible in the output:
//!
//! - keys carrying the reserved-word suffix (`type_`) lose the suffix,
//! - booleans become the lowercase tokens `true`/`false`,
//! - empty text attributes are dropped.
//!
//! # Example
//!
//! ```
//! # use busdecl_core::element::{ElementKind, ElementNode};
//! let mut arg = ElementNode::new(ElementKind::Arg);
//! arg.set_attribute("name", "message");
//! arg.set_attribute("type_", "s");
//! arg.set_attribute("direction", "in");
//!
//! let mut method = ElementNode::new(ElementKind::Method);
//! method.set_attribute("name", "Echo");
//! method.append(arg);
//!
//! let fragment = method.serialize();
//! assert_eq!(fragment.children()[0].attribute("type"), Some("s"));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::xml::Fragment;

/// Attribute keys that collide with Rust keywords and are therefore spelled
/// with a trailing `_` by declaring code.
const RESERVED_KEYWORDS: &[&str] = &["type", "ref", "in", "use", "static", "const"];

/// The kind of an introspection element, which is also its tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Interface,
    Method,
    Property,
    Signal,
    Arg,
    Annotation,
}

impl ElementKind {
    /// Returns the tag name used in the serialized document.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Interface => "interface",
            Self::Method => "method",
            Self::Property => "property",
            Self::Signal => "signal",
            Self::Arg => "arg",
            Self::Annotation => "annotation",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An attribute value: either free text or a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Text(String),
}

impl AttributeValue {
    /// Returns the serialized token for this value.
    ///
    /// Booleans become lowercase literals; text is returned unchanged.
    pub fn to_token(&self) -> String {
        match self {
            Self::Bool(true) => "true".to_string(),
            Self::Bool(false) => "false".to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Returns the text content, or `None` for booleans.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) => None,
        }
    }

    /// Whether this value is dropped at serialization time.
    fn is_unset(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

/// A child entry of an [`ElementNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(ElementNode),
    Group(ElementNodeGroup),
}

impl Child {
    /// Number of elements this child contributes once flattened.
    pub fn width(&self) -> usize {
        match self {
            Self::Node(_) => 1,
            Self::Group(group) => group.len(),
        }
    }
}

impl From<ElementNode> for Child {
    fn from(node: ElementNode) -> Self {
        Self::Node(node)
    }
}

impl From<ElementNodeGroup> for Child {
    fn from(group: ElementNodeGroup) -> Self {
        Self::Group(group)
    }
}

/// A labeled tree node with attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    kind: ElementKind,
    attributes: IndexMap<String, AttributeValue>,
    children: Vec<Child>,
}

impl ElementNode {
    /// Creates an empty node of the given kind.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style variant of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Appends a node or a group to the child sequence.
    pub fn append(&mut self, child: impl Into<Child>) {
        self.children.push(child.into());
    }

    /// Sets an attribute, replacing any previous value for the same key.
    ///
    /// A replaced key keeps its original position.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Returns the attribute stored under `key` exactly as it was set.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns the attribute stored under `key`, or `default` when absent.
    pub fn get_attribute(&self, key: &str, default: impl Into<AttributeValue>) -> AttributeValue {
        self.attributes
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Convenience accessor for the `name` attribute as text.
    pub fn name(&self) -> Option<&str> {
        self.attribute("name").and_then(AttributeValue::as_text)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Number of children once groups are flattened.
    pub fn flattened_len(&self) -> usize {
        self.children.iter().map(Child::width).sum()
    }

    /// Serializes this node and its subtree.
    ///
    /// Group children are expanded in place, preserving declaration order.
    /// The node itself is not modified.
    pub fn serialize(&self) -> Fragment {
        let attributes = self
            .attributes
            .iter()
            .filter(|(_, value)| !value.is_unset())
            .map(|(key, value)| (normalize_key(key).to_string(), value.to_token()))
            .collect();

        let mut children = Vec::with_capacity(self.flattened_len());
        for child in &self.children {
            match child {
                Child::Node(node) => children.push(node.serialize()),
                Child::Group(group) => children.extend(group.serialize()),
            }
        }

        Fragment::new(self.kind.tag(), attributes, children)
    }
}

/// An ordered bundle of nodes that serialize as siblings of their parent's
/// other children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementNodeGroup {
    nodes: Vec<ElementNode>,
}

impl ElementNodeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ElementNode) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementNode> {
        self.nodes.iter()
    }

    /// Serializes every member, in order.
    pub fn serialize(&self) -> Vec<Fragment> {
        self.nodes.iter().map(ElementNode::serialize).collect()
    }
}

impl From<Vec<ElementNode>> for ElementNodeGroup {
    fn from(nodes: Vec<ElementNode>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<ElementNode> for ElementNodeGroup {
    fn from_iter<I: IntoIterator<Item = ElementNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Strips the reserved-word suffix from an attribute key.
fn normalize_key(key: &str) -> &str {
    match key.strip_suffix('_') {
        Some(stem) if RESERVED_KEYWORDS.contains(&stem) => stem,
        _ => key,
    }
}
