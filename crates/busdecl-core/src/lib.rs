//! Busdecl Core Types
//!
//! This crate provides the building blocks of D-Bus introspection documents:
//!
//! - **Elements**: A generic labeled tree ([`element::ElementNode`]) with
//!   groups of peer elements ([`element::ElementNodeGroup`])
//! - **Serialization**: Document fragments and XML rendering ([`xml`] module)
//! - **Annotations**: Key/value metadata with a well-known catalogue ([`annotation`] module)
//! - **Arguments**: Typed method and signal arguments ([`arg`] module)
//! - **Members**: Method, signal and property elements ([`member`] module)
//! - **Values**: Dynamically typed payloads ([`value::Value`])
//! - **Paths**: Namespace and object path helpers ([`path`] module)

pub mod annotation;
pub mod arg;
pub mod element;
pub mod error;
pub mod member;
pub mod path;
pub mod value;
pub mod xml;

pub use annotation::{Annotation, EmitsChangedSignal, WellKnown};
pub use arg::{Arg, Direction};
pub use element::{AttributeValue, Child, ElementKind, ElementNode, ElementNodeGroup};
pub use error::DeclarationError;
pub use member::{Access, MemberChild, Method, Property, Signal};
pub use value::Value;
pub use xml::{Document, Fragment};
