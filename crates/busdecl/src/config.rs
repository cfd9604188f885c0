//! Configuration for closing an introspector and rendering its document.
//!
//! [`IntrospectorConfig`] implements [`serde::Deserialize`] so it can be
//! loaded from external sources; every field has a default.
//!
//! # Example
//!
//! ```
//! # use busdecl::config::IntrospectorConfig;
//! let config = IntrospectorConfig::default();
//! assert!(config.doctype());
//! assert_eq!(config.indent(), 2);
//! assert_eq!(config.type_name(), None);
//! ```

use serde::Deserialize;

/// Options applied when an introspector is closed and materialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntrospectorConfig {
    /// Overrides the interface name segment derived from the owning type.
    type_name: Option<String>,

    /// Emit the DOCTYPE preamble.
    doctype: bool,

    /// Indentation width of the pretty-printed document.
    indent: usize,
}

impl Default for IntrospectorConfig {
    fn default() -> Self {
        Self {
            type_name: None,
            doctype: true,
            indent: 2,
        }
    }
}

impl IntrospectorConfig {
    /// Creates a new [`IntrospectorConfig`] with the given rendering options.
    ///
    /// # Arguments
    ///
    /// * `doctype` - Whether the DOCTYPE preamble is emitted.
    /// * `indent` - Indentation width of nested elements.
    pub fn new(doctype: bool, indent: usize) -> Self {
        Self {
            type_name: None,
            doctype,
            indent,
        }
    }

    /// Sets the interface name segment used instead of the type's own name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn doctype(&self) -> bool {
        self.doctype
    }

    pub fn indent(&self) -> usize {
        self.indent
    }
}
