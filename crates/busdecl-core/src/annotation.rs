//! Introspection annotations.
//!
//! Method, interface, property, signal and argument elements may carry
//! annotations: generic key/value metadata. Some annotation names are defined
//! by the introspection format itself and accept only a closed set of values;
//! those are catalogued in [`WellKnown`] so that bad values fail while the
//! interface is still being declared.
//!
//! # Example
//!
//! ```
//! # use busdecl_core::annotation::{Annotation, EmitsChangedSignal};
//! let deprecated = Annotation::deprecated();
//! assert_eq!(deprecated.value().to_token(), "true");
//!
//! let emits = Annotation::emits_changed_signal(EmitsChangedSignal::Invalidates);
//! assert_eq!(emits.value().to_token(), "invalidates");
//!
//! // Values outside a well-known annotation's closed set are rejected.
//! assert!(Annotation::new("org.freedesktop.DBus.Deprecated", Some("maybe".into())).is_err());
//! ```

use log::trace;

use crate::{
    element::{AttributeValue, ElementKind, ElementNode},
    error::DeclarationError,
};

const BOOLEAN_TOKENS: &[&str] = &["true", "false"];
const EMITS_CHANGED_TOKENS: &[&str] = &["true", "invalidates", "const", "false"];

/// Annotations defined by the introspection format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    /// Whether the entity is deprecated. Defaults to `true` here, since the
    /// point of attaching it is to mark something deprecated.
    Deprecated,
    /// The C symbol for a method or interface. No default.
    GLibCSymbol,
    /// Callers should not expect a reply. Defaults to `true`.
    MethodNoReply,
    /// Whether and how `PropertiesChanged` is emitted for a property.
    PropertyEmitsChangedSignal,
}

impl WellKnown {
    const ALL: [WellKnown; 4] = [
        Self::Deprecated,
        Self::GLibCSymbol,
        Self::MethodNoReply,
        Self::PropertyEmitsChangedSignal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deprecated => "org.freedesktop.DBus.Deprecated",
            Self::GLibCSymbol => "org.freedesktop.DBus.GLib.CSymbol",
            Self::MethodNoReply => "org.freedesktop.DBus.Method.NoReply",
            Self::PropertyEmitsChangedSignal => "org.freedesktop.DBus.Property.EmitsChangedSignal",
        }
    }

    pub fn default_value(&self) -> Option<AttributeValue> {
        match self {
            Self::Deprecated | Self::MethodNoReply => Some(AttributeValue::Bool(true)),
            Self::GLibCSymbol | Self::PropertyEmitsChangedSignal => None,
        }
    }

    /// Serialized tokens accepted as values. Empty means unrestricted.
    pub fn valid_values(&self) -> &'static [&'static str] {
        match self {
            Self::Deprecated | Self::MethodNoReply => BOOLEAN_TOKENS,
            Self::GLibCSymbol => &[],
            Self::PropertyEmitsChangedSignal => EMITS_CHANGED_TOKENS,
        }
    }

    /// Looks up a catalogue entry by its annotation name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.name() == name)
    }
}

/// Values of the `org.freedesktop.DBus.Property.EmitsChangedSignal` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitsChangedSignal {
    /// The signal is emitted with the new value included.
    True,
    /// The signal is emitted but the value is not included.
    Invalidates,
    /// The property never changes during the object's lifetime.
    Const,
    /// The signal is not guaranteed to be emitted.
    False,
}

impl From<EmitsChangedSignal> for AttributeValue {
    fn from(value: EmitsChangedSignal) -> Self {
        match value {
            EmitsChangedSignal::True => AttributeValue::Bool(true),
            EmitsChangedSignal::False => AttributeValue::Bool(false),
            EmitsChangedSignal::Invalidates => AttributeValue::from("invalidates"),
            EmitsChangedSignal::Const => AttributeValue::from("const"),
        }
    }
}

/// A key/value metadata element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    name: String,
    value: AttributeValue,
    default_value: Option<AttributeValue>,
    valid_values: &'static [&'static str],
}

impl Annotation {
    /// Creates an annotation.
    ///
    /// When `name` belongs to the [`WellKnown`] catalogue, that entry's
    /// default and closed value set apply.
    ///
    /// # Errors
    ///
    /// - [`DeclarationError::MissingAnnotationValue`] when `value` is `None`
    ///   and there is no default.
    /// - [`DeclarationError::InvalidAnnotationValue`] when the value is not a
    ///   member of a non-empty valid set.
    pub fn new(name: impl Into<String>, value: Option<AttributeValue>) -> Result<Self, DeclarationError> {
        let name = name.into();
        let (default_value, valid_values) = match WellKnown::from_name(&name) {
            Some(known) => (known.default_value(), known.valid_values()),
            None => (None, &[][..]),
        };
        Self::build(name, value, default_value, valid_values)
    }

    /// Creates a catalogued annotation, falling back to its default.
    pub fn well_known(known: WellKnown, value: Option<AttributeValue>) -> Result<Self, DeclarationError> {
        Self::build(
            known.name().to_string(),
            value,
            known.default_value(),
            known.valid_values(),
        )
    }

    /// `org.freedesktop.DBus.Deprecated = true`.
    pub fn deprecated() -> Self {
        Self::catalogued(WellKnown::Deprecated, AttributeValue::Bool(true))
    }

    /// `org.freedesktop.DBus.Method.NoReply = true`.
    pub fn method_no_reply() -> Self {
        Self::catalogued(WellKnown::MethodNoReply, AttributeValue::Bool(true))
    }

    /// `org.freedesktop.DBus.Property.EmitsChangedSignal` with a typed value.
    pub fn emits_changed_signal(value: EmitsChangedSignal) -> Self {
        Self::catalogued(WellKnown::PropertyEmitsChangedSignal, value.into())
    }

    /// `org.freedesktop.DBus.GLib.CSymbol` naming the given symbol.
    pub fn c_symbol(symbol: impl Into<String>) -> Self {
        Self::catalogued(WellKnown::GLibCSymbol, AttributeValue::Text(symbol.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_ref()
    }

    pub fn valid_values(&self) -> &'static [&'static str] {
        self.valid_values
    }

    /// Checks `value` against this annotation's closed value set.
    ///
    /// Always succeeds when the set is empty.
    pub fn validate(&self, value: &AttributeValue) -> Result<(), DeclarationError> {
        check_value(&self.name, value, self.valid_values)
    }

    pub fn to_element(&self) -> ElementNode {
        ElementNode::new(ElementKind::Annotation)
            .with_attribute("name", self.name.as_str())
            .with_attribute("value", self.value.clone())
    }

    fn build(
        name: String,
        value: Option<AttributeValue>,
        default_value: Option<AttributeValue>,
        valid_values: &'static [&'static str],
    ) -> Result<Self, DeclarationError> {
        let value = match value.or_else(|| default_value.clone()) {
            Some(value) => value,
            None => return Err(DeclarationError::MissingAnnotationValue { name }),
        };
        check_value(&name, &value, valid_values)?;
        trace!(name = name.as_str(), value = value.to_token(); "Annotation declared");

        Ok(Self {
            name,
            value,
            default_value,
            valid_values,
        })
    }

    /// Builds a catalogue entry from a value known to be in its set.
    fn catalogued(known: WellKnown, value: AttributeValue) -> Self {
        Self {
            name: known.name().to_string(),
            value,
            default_value: known.default_value(),
            valid_values: known.valid_values(),
        }
    }
}

fn check_value(
    name: &str,
    value: &AttributeValue,
    valid_values: &[&str],
) -> Result<(), DeclarationError> {
    let token = value.to_token();
    if valid_values.is_empty() || valid_values.contains(&token.as_str()) {
        return Ok(());
    }
    Err(DeclarationError::InvalidAnnotationValue {
        name: name.to_string(),
        value: token,
        allowed: valid_values.join(", "),
    })
}
