//! Runtime facade of a constructed service instance.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use log::{debug, trace};

use busdecl_core::{Value, path::service_path};

use crate::{
    error::{BoxError, BusdeclError},
    introspector::ServiceType,
    property::PropertyDescriptor,
    signal::{PROPERTIES_CHANGED, PendingSignal, SignalRegistry, Subscription},
    transport::{Published, Transport},
};

/// An instance of a closed service type.
///
/// Owns the user value, the per-instance signal subscribers, and a handle to
/// the shared introspection document. Property access, method calls and
/// signal emission go through this facade.
pub struct Object<T> {
    ty: Arc<ServiceType<T>>,
    inner: T,
    signals: SignalRegistry,
    introspection: Arc<str>,
}

impl<T> Object<T> {
    pub(crate) fn new(ty: Arc<ServiceType<T>>, inner: T, introspection: Arc<str>) -> Self {
        Self {
            ty,
            inner,
            signals: SignalRegistry::new(),
            introspection,
        }
    }

    /// The introspection document shared by every instance of this type.
    pub fn introspection(&self) -> &Arc<str> {
        &self.introspection
    }

    pub fn service_type(&self) -> &Arc<ServiceType<T>> {
        &self.ty
    }

    pub fn interface_name(&self) -> &str {
        self.ty.namespace()
    }

    /// Default object path derived from the interface name.
    pub fn object_path(&self) -> String {
        service_path(self.interface_name())
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Direct mutable access to the wrapped value. Bypasses setters, so no
    /// notifications are emitted.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Reads a property through its getter.
    ///
    /// # Errors
    ///
    /// - [`BusdeclError::UnknownProperty`] for an undeclared property.
    /// - [`BusdeclError::NotImplemented`] when a readable property has no getter.
    pub fn get(&self, property: &str) -> Result<Value, BusdeclError> {
        self.descriptor(property)?.get(&self.inner)
    }

    /// Writes a property through its setter, then emits every signal the
    /// setter asked for, in order.
    ///
    /// # Errors
    ///
    /// Setter errors are returned before anything is emitted. A failing
    /// subscriber aborts the remaining emissions.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<(), BusdeclError> {
        let descriptor = self
            .ty
            .interface()
            .property_descriptor(property)
            .ok_or_else(|| BusdeclError::UnknownProperty(property.to_string()))?;
        let outcome = descriptor.set(&mut self.inner, value.into())?;
        self.dispatch(outcome.into_pending())
    }

    /// Emits `PropertiesChanged` for this object's interface.
    ///
    /// Changed values are read from the getters now, not when the properties
    /// were mutated.
    pub fn properties_changed<C, I, S>(&self, changed: C, invalidated: I) -> Result<(), BusdeclError>
    where
        C: IntoIterator<Item = S>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = IndexMap::new();
        for name in changed {
            let name = name.as_ref();
            values.insert(name.to_string(), self.get(name)?);
        }
        let invalidated = invalidated
            .into_iter()
            .map(|name| self.descriptor(name.as_ref()).map(|d| Value::Str(d.name().to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(interface = self.interface_name(), changed = values.len(), invalidated = invalidated.len(); "Properties changed");
        let payload = [
            Value::Str(self.interface_name().to_string()),
            Value::Dict(values),
            Value::Array(invalidated),
        ];
        self.signals.emit(PROPERTIES_CHANGED, &payload)
    }

    /// Emits a declared signal, or `PropertiesChanged` with a raw payload.
    pub fn emit(&self, signal: &str, args: &[Value]) -> Result<(), BusdeclError> {
        self.ensure_signal(signal)?;
        self.signals.emit(signal, args)
    }

    /// Subscribes `callback` to a declared signal or to `PropertiesChanged`.
    pub fn connect<F>(&self, signal: &str, callback: F) -> Result<Subscription, BusdeclError>
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
    {
        self.ensure_signal(signal)?;
        Ok(self.signals.connect(signal, callback))
    }

    pub fn subscriber_count(&self, signal: &str) -> usize {
        self.signals.subscriber_count(signal)
    }

    /// Invokes the handler bound to a declared method.
    ///
    /// # Errors
    ///
    /// - [`BusdeclError::UnknownMethod`] for an undeclared method.
    /// - [`BusdeclError::NotImplemented`] when no handler is bound.
    /// - [`BusdeclError::Handler`] when the handler fails.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, BusdeclError> {
        let handler = self.ty.interface().method_handler(method)?;
        trace!(method, args = args.len(); "Calling method");
        handler(&mut self.inner, args).map_err(|source| BusdeclError::Handler {
            member: method.to_string(),
            source,
        })
    }

    /// Hands this object to `transport` under `path`, or under
    /// [`object_path`](Self::object_path) when `path` is `None`.
    ///
    /// Returns the path used.
    pub fn publish<Tr>(&self, transport: &Tr, path: Option<&str>) -> Result<String, BusdeclError>
    where
        Tr: Transport + ?Sized,
    {
        let path = path.map_or_else(|| self.object_path(), str::to_string);
        transport.publish(&path, self).map_err(BusdeclError::Transport)?;
        debug!(interface = self.interface_name(), path = path.as_str(); "Object published");
        Ok(path)
    }

    fn dispatch(&self, pending: Vec<PendingSignal>) -> Result<(), BusdeclError> {
        for signal in pending {
            match signal {
                PendingSignal::PropertiesChanged { changed, invalidated } => {
                    self.properties_changed(&changed, &invalidated)?;
                }
                PendingSignal::Signal { name, args } => self.emit(&name, &args)?,
            }
        }
        Ok(())
    }

    fn descriptor(&self, property: &str) -> Result<&PropertyDescriptor<T>, BusdeclError> {
        self.ty
            .interface()
            .property_descriptor(property)
            .ok_or_else(|| BusdeclError::UnknownProperty(property.to_string()))
    }

    fn ensure_signal(&self, signal: &str) -> Result<(), BusdeclError> {
        if signal == PROPERTIES_CHANGED || self.ty.interface().emitter(signal).is_some() {
            Ok(())
        } else {
            Err(BusdeclError::UnknownSignal(signal.to_string()))
        }
    }
}

impl<T> Published for Object<T> {
    fn interface_name(&self) -> &str {
        Object::interface_name(self)
    }

    fn introspection(&self) -> &str {
        &self.introspection
    }

    fn property(&self, name: &str) -> Result<Value, BusdeclError> {
        self.get(name)
    }
}

impl<T: fmt::Debug> fmt::Debug for Object<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("interface", &self.interface_name())
            .field("inner", &self.inner)
            .field("signals", &self.signals)
            .finish()
    }
}
