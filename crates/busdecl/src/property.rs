//! Property descriptors: the runtime half of a declared property.
//!
//! A [`PropertyDescriptor`] binds a getter, an optional setter and an optional
//! [`Emitter`] to a property name, and enforces the access-mode contract:
//!
//! | Access | Getter | Setter |
//! |---|---|---|
//! | `read` | bound getter, or a stub failing with `NotImplemented` | attaching one fails with `AccessViolation` |
//! | `write` | no-op returning [`Value::Unit`] | bound setter, or a stub failing with `NotImplemented` |
//! | `readwrite` | bound getter, or a stub failing with `NotImplemented` | bound setter, or a stub failing with `NotImplemented` |
//!
//! Setters return a [`SetOutcome`] listing the signals they want emitted. The
//! framework never emits on a setter's behalf; an empty outcome emits nothing.

use std::fmt;

use log::trace;

use busdecl_core::{Access, MemberChild, Value};

use crate::{
    error::{BoxError, BusdeclError},
    signal::{Emitter, PendingSignal},
};

/// Reads a property from its owning instance.
pub type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Writes a property on its owning instance.
pub type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<SetOutcome, BoxError> + Send + Sync>;

/// Signals a setter asks its caller to emit, in order.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct SetOutcome {
    pending: Vec<PendingSignal>,
}

impl SetOutcome {
    /// Nothing observable changed.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Request `PropertiesChanged` for the named properties.
    pub fn properties_changed<I, S>(changed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::unchanged().with(PendingSignal::properties_changed(changed))
    }

    /// Appends another pending signal.
    pub fn with(mut self, signal: PendingSignal) -> Self {
        self.pending.push(signal);
        self
    }

    pub fn pending(&self) -> &[PendingSignal] {
        &self.pending
    }

    pub fn into_pending(self) -> Vec<PendingSignal> {
        self.pending
    }
}

enum GetterSlot<T> {
    Empty,
    Stub,
    Bound(Getter<T>),
}

enum SetterSlot<T> {
    Forbidden,
    Stub,
    Bound(Setter<T>),
}

/// Getter/setter/emitter binding of one property.
pub struct PropertyDescriptor<T> {
    name: String,
    access: Access,
    getter: GetterSlot<T>,
    setter: SetterSlot<T>,
    emitter: Option<Emitter>,
}

impl<T> PropertyDescriptor<T> {
    /// Creates a descriptor whose getter and setter are stubs where the
    /// access mode allows them.
    pub fn new(name: impl Into<String>, access: Access) -> Self {
        let getter = match access {
            Access::Write => GetterSlot::Empty,
            Access::Read | Access::ReadWrite => GetterSlot::Stub,
        };
        let setter = match access {
            Access::Read => SetterSlot::Forbidden,
            Access::Write | Access::ReadWrite => SetterSlot::Stub,
        };
        Self {
            name: name.into(),
            access,
            getter,
            setter,
            emitter: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// The companion signal emitter, present when declared with
    /// `signal_on_change`.
    pub fn emitter(&self) -> Option<&Emitter> {
        self.emitter.as_ref()
    }

    pub fn has_getter(&self) -> bool {
        matches!(self.getter, GetterSlot::Bound(_))
    }

    pub fn has_setter(&self) -> bool {
        matches!(self.setter, SetterSlot::Bound(_))
    }

    /// Binds the getter.
    ///
    /// # Errors
    ///
    /// Returns [`BusdeclError::AccessViolation`] for write-only properties.
    pub fn attach_getter<F>(&mut self, getter: F) -> Result<(), BusdeclError>
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        if !self.access.is_readable() {
            return Err(self.violation("attaching a getter"));
        }
        self.getter = GetterSlot::Bound(Box::new(getter));
        Ok(())
    }

    /// Binds the setter.
    ///
    /// # Errors
    ///
    /// Returns [`BusdeclError::AccessViolation`] for read-only properties.
    pub fn attach_setter<F>(&mut self, setter: F) -> Result<(), BusdeclError>
    where
        F: Fn(&mut T, Value) -> Result<SetOutcome, BoxError> + Send + Sync + 'static,
    {
        if !self.access.is_writable() {
            return Err(self.violation("attaching a setter"));
        }
        self.setter = SetterSlot::Bound(Box::new(setter));
        Ok(())
    }

    /// Reads the property. Write-only properties always read as [`Value::Unit`].
    ///
    /// # Errors
    ///
    /// Returns [`BusdeclError::NotImplemented`] for a readable property that
    /// never had a getter attached.
    pub fn get(&self, instance: &T) -> Result<Value, BusdeclError> {
        match &self.getter {
            GetterSlot::Empty => Ok(Value::Unit),
            GetterSlot::Stub => Err(BusdeclError::NotImplemented(self.name.clone())),
            GetterSlot::Bound(getter) => Ok(getter(instance)),
        }
    }

    /// Writes the property.
    ///
    /// # Errors
    ///
    /// - [`BusdeclError::AccessViolation`] for read-only properties.
    /// - [`BusdeclError::NotImplemented`] when no setter was attached.
    /// - [`BusdeclError::Handler`] when the setter itself fails.
    pub fn set(&self, instance: &mut T, value: Value) -> Result<SetOutcome, BusdeclError> {
        trace!(property = self.name.as_str(), value:% = value; "Setting property");
        match &self.setter {
            SetterSlot::Forbidden => Err(self.violation("setting")),
            SetterSlot::Stub => Err(BusdeclError::NotImplemented(self.name.clone())),
            SetterSlot::Bound(setter) => setter(instance, value).map_err(|source| BusdeclError::Handler {
                member: self.name.clone(),
                source,
            }),
        }
    }

    pub(crate) fn set_emitter(&mut self, emitter: Emitter) {
        self.emitter = Some(emitter);
    }

    fn violation(&self, operation: &'static str) -> BusdeclError {
        BusdeclError::AccessViolation {
            property: self.name.clone(),
            access: self.access,
            operation,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("has_getter", &self.has_getter())
            .field("has_setter", &self.has_setter())
            .field("emitter", &self.emitter)
            .finish()
    }
}

/// Declaration inputs of a property.
///
/// # Example
///
/// ```
/// # use busdecl::{Access, PropertyDecl};
/// let decl = PropertyDecl::read_write("i").signal_on_change(true);
/// assert_eq!(decl.access(), Access::ReadWrite);
/// assert!(decl.emits_on_change());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    signature: String,
    access: Access,
    signal_on_change: bool,
    children: Vec<MemberChild>,
}

impl PropertyDecl {
    pub fn new(signature: impl Into<String>, access: Access) -> Self {
        Self {
            signature: signature.into(),
            access,
            signal_on_change: false,
            children: Vec::new(),
        }
    }

    pub fn read(signature: impl Into<String>) -> Self {
        Self::new(signature, Access::Read)
    }

    pub fn write(signature: impl Into<String>) -> Self {
        Self::new(signature, Access::Write)
    }

    pub fn read_write(signature: impl Into<String>) -> Self {
        Self::new(signature, Access::ReadWrite)
    }

    /// Attach the `EmitsChangedSignal` annotation and a companion signal.
    pub fn signal_on_change(mut self, enabled: bool) -> Self {
        self.signal_on_change = enabled;
        self
    }

    /// Adds a child element. Only annotations are accepted when declared.
    pub fn annotate(mut self, child: impl Into<MemberChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn emits_on_change(&self) -> bool {
        self.signal_on_change
    }

    pub(crate) fn into_children(self) -> Vec<MemberChild> {
        self.children
    }
}

/// Continues a property declaration with its getter and setter.
pub struct PropertyBuilder<'a, T> {
    descriptor: &'a mut PropertyDescriptor<T>,
}

impl<'a, T> PropertyBuilder<'a, T> {
    pub(crate) fn new(descriptor: &'a mut PropertyDescriptor<T>) -> Self {
        Self { descriptor }
    }

    /// Binds the getter. Fails for write-only properties.
    pub fn getter<F>(self, getter: F) -> Result<Self, BusdeclError>
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.descriptor.attach_getter(getter)?;
        Ok(self)
    }

    /// Binds the setter. Fails for read-only properties.
    pub fn setter<F>(self, setter: F) -> Result<Self, BusdeclError>
    where
        F: Fn(&mut T, Value) -> Result<SetOutcome, BoxError> + Send + Sync + 'static,
    {
        self.descriptor.attach_setter(setter)?;
        Ok(self)
    }

    pub fn emitter(&self) -> Option<&Emitter> {
        self.descriptor.emitter()
    }

    pub fn descriptor(&self) -> &PropertyDescriptor<T> {
        self.descriptor
    }
}
