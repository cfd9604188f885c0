//! The introspector: declaring, closing and materializing a service type.
//!
//! An [`Introspector`] is an [`Interface`] under construction. Closing it fixes
//! the interface name as `<namespace>.<TypeName>` and yields a shared
//! [`ServiceType`]. The first constructed instance renders the introspection
//! document; every later instance of the same service type reuses it.
//!
//! ```text
//! Declared ──close()──▶ Closed ──first construct()──▶ Materialized
//! ```

use std::{
    any,
    fmt,
    ops::{Deref, DerefMut},
    sync::{Arc, OnceLock},
};

use indexmap::IndexMap;
use log::{debug, info};

use busdecl_core::{Document, ElementKind, ElementNode, Value, path::join_path};

use crate::{
    config::IntrospectorConfig,
    error::{BoxError, BusdeclError},
    interface::Interface,
    object::Object,
};

/// Constructor argument reserved for the introspector.
pub const RESERVED_INIT_ARG: &str = "namespace";

/// Lifecycle of a declared service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationState {
    /// Members are still being declared.
    Declared,
    /// The interface name is fixed; no document yet.
    Closed,
    /// The introspection document has been rendered and cached.
    Materialized,
}

/// Builder of a service type's interface.
///
/// Dereferences to [`Interface`], so members are declared directly on the
/// introspector.
///
/// # Example
///
/// ```
/// # use busdecl::{Arg, InitArgs, Introspector, PropertyDecl, Value};
/// struct ExampleService;
///
/// let mut introspector = Introspector::<ExampleService>::new("com.example.service");
/// introspector.method("HelloWorld", [], Some("s"))?;
/// introspector.method("Echo", [Arg::new("message", "s")?.into()], Some("s"))?;
/// introspector
///     .property("Status", PropertyDecl::read("b"))?
///     .getter(|_: &ExampleService| Value::from(true))?;
///
/// let service = introspector.close();
/// assert_eq!(service.namespace(), "com.example.service.ExampleService");
///
/// let object = service.construct(InitArgs::new(), |_| Ok(ExampleService))?;
/// assert!(object.introspection().contains("<method name=\"Echo\">"));
/// # Ok::<(), busdecl::BusdeclError>(())
/// ```
pub struct Introspector<T> {
    interface: Interface<T>,
    config: IntrospectorConfig,
}

impl<T> Introspector<T> {
    /// Starts declaring under `namespace`, written with dots or slashes.
    pub fn new(namespace: &str) -> Self {
        Self {
            interface: Interface::new(namespace),
            config: IntrospectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IntrospectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IntrospectorConfig {
        &self.config
    }

    pub fn state(&self) -> DeclarationState {
        DeclarationState::Declared
    }

    /// Fixes the interface name and ends the declaration phase.
    ///
    /// The name is the declared namespace joined with the configured
    /// `type_name`, or with the unqualified name of `T` when none is set.
    pub fn close(self) -> Arc<ServiceType<T>> {
        let Self { mut interface, config } = self;

        let type_name = config.type_name().unwrap_or_else(|| short_type_name::<T>());
        let namespace = join_path([interface.namespace(), type_name]);
        interface.rename(namespace);

        info!(namespace = interface.namespace(); "Interface closed");
        Arc::new(ServiceType {
            interface,
            config,
            document: OnceLock::new(),
        })
    }
}

impl<T> Deref for Introspector<T> {
    type Target = Interface<T>;

    fn deref(&self) -> &Self::Target {
        &self.interface
    }
}

impl<T> DerefMut for Introspector<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.interface
    }
}

impl<T> fmt::Debug for Introspector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Introspector")
            .field("interface", &self.interface)
            .field("config", &self.config)
            .finish()
    }
}

/// A closed service type, shared by all of its instances.
pub struct ServiceType<T> {
    interface: Interface<T>,
    config: IntrospectorConfig,
    document: OnceLock<Arc<str>>,
}

impl<T> ServiceType<T> {
    pub fn state(&self) -> DeclarationState {
        if self.document.get().is_some() {
            DeclarationState::Materialized
        } else {
            DeclarationState::Closed
        }
    }

    /// The closed interface name.
    pub fn namespace(&self) -> &str {
        self.interface.namespace()
    }

    pub fn interface(&self) -> &Interface<T> {
        &self.interface
    }

    pub fn config(&self) -> &IntrospectorConfig {
        &self.config
    }

    /// The introspection document, rendered on first access.
    pub fn introspection(&self) -> Arc<str> {
        let document = self.document.get_or_init(|| self.render());
        Arc::clone(document)
    }

    /// Constructs an instance.
    ///
    /// The document is materialized before `ctor` runs, so the constructor
    /// already observes a [`DeclarationState::Materialized`] type.
    ///
    /// # Errors
    ///
    /// - [`BusdeclError::ReservedKeyword`] if `args` contains `namespace`.
    /// - [`BusdeclError::Handler`] if `ctor` fails.
    pub fn construct<F>(self: &Arc<Self>, args: InitArgs, ctor: F) -> Result<Object<T>, BusdeclError>
    where
        F: FnOnce(InitArgs) -> Result<T, BoxError>,
    {
        if args.contains(RESERVED_INIT_ARG) {
            return Err(BusdeclError::ReservedKeyword(RESERVED_INIT_ARG.to_string()));
        }

        let introspection = self.introspection();
        let inner = ctor(args).map_err(|source| BusdeclError::Handler {
            member: self.namespace().to_string(),
            source,
        })?;
        debug!(namespace = self.namespace(); "Instance constructed");
        Ok(Object::new(Arc::clone(self), inner, introspection))
    }

    /// Wraps an already-built value as an instance.
    pub fn instantiate(self: &Arc<Self>, inner: T) -> Object<T> {
        let introspection = self.introspection();
        Object::new(Arc::clone(self), inner, introspection)
    }

    fn render(&self) -> Arc<str> {
        let mut root = ElementNode::new(ElementKind::Node).with_attribute("name", self.namespace());
        root.append(self.interface.element().clone());

        let document = Document::new(root.serialize())
            .with_doctype(self.config.doctype())
            .with_indent(self.config.indent());
        let rendered = document.to_string();

        info!(namespace = self.namespace(), bytes = rendered.len(); "Introspection document materialized");
        Arc::from(rendered)
    }
}

impl<T> fmt::Debug for ServiceType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceType")
            .field("interface", &self.interface)
            .field("state", &self.state())
            .finish()
    }
}

/// Named constructor arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitArgs(IndexMap<String, Value>);

impl InitArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InitArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Last path segment of `T`'s name, without generic parameters.
fn short_type_name<T>() -> &'static str {
    let full = any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
