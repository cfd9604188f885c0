//! Interface declarations.
//!
//! An [`Interface`] accumulates methods, properties and signals under a dotted
//! namespace. Each declaration appends its element to the interface tree
//! immediately, so the serialized document lists members in declaration order.
//! Properties and signals additionally register their runtime halves: a
//! [`PropertyDescriptor`] or an [`Emitter`].

use std::fmt;

use indexmap::IndexMap;
use log::debug;

use busdecl_core::{
    Annotation, Arg, DeclarationError, Direction, ElementKind, ElementNode, ElementNodeGroup,
    EmitsChangedSignal, Fragment, MemberChild, Method, Property, Signal, Value, WellKnown,
    path::dot_notation,
};

use crate::{
    error::{BoxError, BusdeclError},
    property::{PropertyBuilder, PropertyDecl, PropertyDescriptor},
    signal::Emitter,
};

/// Implementation of a declared method.
pub type MethodHandler<T> = Box<dyn Fn(&mut T, &[Value]) -> Result<Value, BoxError> + Send + Sync>;

/// Suffix of the companion signal declared for `signal_on_change` properties.
pub const CHANGED_SIGNAL_SUFFIX: &str = "Changed";

/// Name of the single argument of a companion signal.
pub const CHANGED_SIGNAL_ARG: &str = "value";

/// A namespaced collection of methods, properties and signals owned by `T`.
///
/// # Example
///
/// ```
/// # use busdecl::{Arg, Interface, PropertyDecl, Value};
/// struct Svc {
///     status: bool,
/// }
///
/// let mut iface = Interface::<Svc>::new("com.example.Svc");
/// iface.method("Echo", [Arg::new("message", "s")?.into()], Some("s"))?;
/// iface
///     .property("Status", PropertyDecl::read("b"))?
///     .getter(|svc: &Svc| Value::from(svc.status))?;
/// iface.signal("Ready", [], None)?;
///
/// assert_eq!(iface.serialize().children().len(), 3);
/// # Ok::<(), busdecl::BusdeclError>(())
/// ```
pub struct Interface<T> {
    namespace: String,
    node: ElementNode,
    methods: IndexMap<String, Option<MethodHandler<T>>>,
    properties: IndexMap<String, PropertyDescriptor<T>>,
    signals: IndexMap<String, Emitter>,
}

impl<T> Interface<T> {
    /// Creates an empty interface. Slashes in `namespace` become dots.
    pub fn new(namespace: &str) -> Self {
        let namespace = dot_notation(namespace);
        let node = ElementNode::new(ElementKind::Interface).with_attribute("name", namespace.as_str());
        Self {
            namespace,
            node,
            methods: IndexMap::new(),
            properties: IndexMap::new(),
            signals: IndexMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Declares a method.
    ///
    /// `children` are arguments and annotations in order. A `response`
    /// signature appends an implicit output argument named `response`.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, an empty response signature, or a duplicate.
    pub fn method<I>(&mut self, name: &str, children: I, response: Option<&str>) -> Result<&mut Self, BusdeclError>
    where
        I: IntoIterator<Item = MemberChild>,
    {
        ensure_unique("method", name, self.methods.contains_key(name))?;

        let mut method = Method::new(self.namespace.as_str(), name)?;
        for child in children {
            method.append(child);
        }
        if let Some(signature) = response {
            method.append(Arg::response(signature)?);
        }

        self.node.append(method.into_element());
        self.methods.insert(name.to_string(), None);
        debug!(namespace = self.namespace.as_str(), name; "Method declared");
        Ok(self)
    }

    /// Binds the implementation of a declared method. The handler is invoked
    /// unchanged by [`Object::call`](crate::Object::call).
    pub fn handle<F>(&mut self, method: &str, handler: F) -> Result<&mut Self, BusdeclError>
    where
        F: Fn(&mut T, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let slot = self
            .methods
            .get_mut(method)
            .ok_or_else(|| BusdeclError::UnknownMethod(method.to_string()))?;
        *slot = Some(Box::new(handler));
        Ok(self)
    }

    /// Declares a property and returns a builder for its getter and setter.
    ///
    /// With `signal_on_change`, the property element gets an
    /// `EmitsChangedSignal = true` annotation and is followed by a companion
    /// `<name>Changed` signal; both are appended as one group. Declaring an
    /// `EmitsChangedSignal` annotation of its own on such a property fails with
    /// [`DeclarationError::ConflictingAnnotation`](busdecl_core::DeclarationError::ConflictingAnnotation).
    pub fn property(&mut self, name: &str, decl: PropertyDecl) -> Result<PropertyBuilder<'_, T>, BusdeclError> {
        ensure_unique("property", name, self.properties.contains_key(name))?;

        let access = decl.access();
        let emits = decl.emits_on_change();
        let signature = decl.signature().to_string();
        let children = decl.into_children();
        if emits && children.iter().any(is_emits_changed_signal) {
            return Err(DeclarationError::ConflictingAnnotation {
                name: WellKnown::PropertyEmitsChangedSignal.name().to_string(),
                member: name.to_string(),
            }
            .into());
        }

        let mut element = Property::new(self.namespace.as_str(), name, &signature, access)?;
        for child in children {
            element.append(child)?;
        }
        let mut descriptor = PropertyDescriptor::new(name, access);

        if emits {
            let signal_name = format!("{name}{CHANGED_SIGNAL_SUFFIX}");
            ensure_unique("signal", &signal_name, self.signals.contains_key(&signal_name))?;

            element.append(Annotation::emits_changed_signal(EmitsChangedSignal::True))?;
            let mut companion = Signal::new(self.namespace.as_str(), &signal_name)?;
            companion.append(Arg::with_direction(CHANGED_SIGNAL_ARG, signature.as_str(), Direction::Out)?);

            self.node.append(ElementNodeGroup::from(vec![
                element.into_element(),
                companion.into_element(),
            ]));
            let emitter = Emitter::new(signal_name.as_str());
            self.signals.insert(signal_name, emitter.clone());
            descriptor.set_emitter(emitter);
        } else {
            self.node.append(element.into_element());
        }

        debug!(namespace = self.namespace.as_str(), name, access = access.as_str(), emits; "Property declared");
        let descriptor = self.properties.entry(name.to_string()).or_insert(descriptor);
        Ok(PropertyBuilder::new(descriptor))
    }

    /// Declares a signal and returns its emitter.
    pub fn signal<I>(&mut self, name: &str, children: I, response: Option<&str>) -> Result<Emitter, BusdeclError>
    where
        I: IntoIterator<Item = MemberChild>,
    {
        ensure_unique("signal", name, self.signals.contains_key(name))?;

        let mut signal = Signal::new(self.namespace.as_str(), name)?;
        for child in children {
            signal.append(child);
        }
        if let Some(signature) = response {
            signal.append(Arg::response(signature)?);
        }

        self.node.append(signal.into_element());
        let emitter = Emitter::new(name);
        self.signals.insert(name.to_string(), emitter.clone());
        debug!(namespace = self.namespace.as_str(), name; "Signal declared");
        Ok(emitter)
    }

    /// Appends an annotation directly under the interface element.
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        self.node.append(annotation.to_element());
        self
    }

    pub fn element(&self) -> &ElementNode {
        &self.node
    }

    /// Serializes the interface element and all declared members.
    pub fn serialize(&self) -> Fragment {
        self.node.serialize()
    }

    pub fn property_descriptor(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor<T>> {
        self.properties.values()
    }

    pub fn emitter(&self, name: &str) -> Option<&Emitter> {
        self.signals.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub(crate) fn method_handler(&self, name: &str) -> Result<&MethodHandler<T>, BusdeclError> {
        match self.methods.get(name) {
            Some(Some(handler)) => Ok(handler),
            Some(None) => Err(BusdeclError::NotImplemented(name.to_string())),
            None => Err(BusdeclError::UnknownMethod(name.to_string())),
        }
    }

    /// Replaces the namespace, renaming the interface element.
    pub(crate) fn rename(&mut self, namespace: String) {
        self.node.set_attribute("name", namespace.as_str());
        self.namespace = namespace;
    }
}

fn is_emits_changed_signal(child: &MemberChild) -> bool {
    matches!(
        child,
        MemberChild::Annotation(annotation)
            if annotation.name() == WellKnown::PropertyEmitsChangedSignal.name()
    )
}

fn ensure_unique(kind: &'static str, name: &str, exists: bool) -> Result<(), BusdeclError> {
    if exists {
        return Err(BusdeclError::DuplicateMember {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

impl<T> fmt::Debug for Interface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("namespace", &self.namespace)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("properties", &self.properties)
            .field("signals", &self.signals.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Svc {
        count: i32,
    }

    fn names(fragment: &Fragment) -> Vec<(&'static str, String)> {
        fragment
            .children()
            .iter()
            .map(|child| (child.tag(), child.attribute("name").unwrap_or_default().to_string()))
            .collect()
    }

    #[test]
    fn test_members_serialize_in_declaration_order() {
        let mut iface = Interface::<Svc>::new("com/example/Svc");
        iface.method("HelloWorld", [], Some("s")).unwrap();
        iface
            .property("Count", PropertyDecl::read_write("i"))
            .unwrap();
        iface.signal("Tick", [Arg::new("n", "i").unwrap().into()], None).unwrap();

        let fragment = iface.serialize();

        assert_eq!(iface.namespace(), "com.example.Svc");
        assert_eq!(fragment.attribute("name"), Some("com.example.Svc"));
        assert_eq!(
            names(&fragment),
            [
                ("method", "HelloWorld".to_string()),
                ("property", "Count".to_string()),
                ("signal", "Tick".to_string()),
            ]
        );
    }

    #[test]
    fn test_method_response_appended_last() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface
            .method(
                "Echo",
                [Arg::new("message", "s").unwrap().into(), Annotation::method_no_reply().into()],
                Some("s"),
            )
            .unwrap();

        let fragment = iface.serialize();
        let method = &fragment.children()[0];
        let response = &method.children()[2];

        assert_eq!(method.children().len(), 3);
        assert_eq!(response.attribute("name"), Some("response"));
        assert_eq!(response.attribute("direction"), Some("out"));
    }

    #[test]
    fn test_signal_on_change_adds_annotation_and_companion() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface
            .property("Count", PropertyDecl::read_write("i").signal_on_change(true))
            .unwrap()
            .getter(|svc: &Svc| Value::from(svc.count))
            .unwrap();

        let svc = Svc { count: 1 };
        let descriptor = iface.property_descriptor("Count").unwrap();
        for _ in 0..3 {
            descriptor.get(&svc).unwrap();
        }

        let fragment = iface.serialize();
        let property = &fragment.children()[0];
        let annotations: Vec<_> = property
            .children()
            .iter()
            .filter(|child| child.attribute("name") == Some("org.freedesktop.DBus.Property.EmitsChangedSignal"))
            .collect();
        let signals: Vec<_> = fragment.children().iter().filter(|child| child.tag() == "signal").collect();

        assert_eq!(iface.element().children().len(), 1);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].attribute("value"), Some("true"));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].attribute("name"), Some("CountChanged"));
        assert_eq!(signals[0].children()[0].attribute("type"), Some("i"));
        assert_eq!(descriptor.emitter().map(Emitter::signal), Some("CountChanged"));
        assert!(iface.emitter("CountChanged").is_some());
    }

    #[test]
    fn test_signal_on_change_rejects_own_emits_changed_annotation() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");

        let result = iface
            .property(
                "Count",
                PropertyDecl::read_write("i")
                    .annotate(Annotation::emits_changed_signal(EmitsChangedSignal::Const))
                    .signal_on_change(true),
            )
            .map(|_| ());

        assert!(matches!(
            result,
            Err(BusdeclError::Declaration(DeclarationError::ConflictingAnnotation { ref member, .. })) if member == "Count"
        ));
        assert!(iface.serialize().children().is_empty());
        assert!(iface.emitter("CountChanged").is_none());
    }

    #[test]
    fn test_own_emits_changed_annotation_kept_without_signal_on_change() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface
            .property(
                "Count",
                PropertyDecl::read("i").annotate(Annotation::emits_changed_signal(EmitsChangedSignal::Const)),
            )
            .unwrap();

        let fragment = iface.serialize();
        let property = &fragment.children()[0];

        assert_eq!(property.children().len(), 1);
        assert_eq!(property.children()[0].attribute("value"), Some("const"));
    }

    #[test]
    fn test_property_rejects_arg_child() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");

        let result = iface.property(
            "Count",
            PropertyDecl::read("i").annotate(Arg::new("x", "i").unwrap()),
        );

        assert!(matches!(
            result,
            Err(BusdeclError::Declaration(DeclarationError::InvalidChild { .. }))
        ));
        assert!(iface.serialize().children().is_empty());
        assert!(iface.property_descriptor("Count").is_none());
    }

    #[test]
    fn test_read_property_builder_rejects_setter() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");

        let result = iface
            .property("Count", PropertyDecl::read("i"))
            .unwrap()
            .setter(|svc: &mut Svc, value| {
                svc.count = value.as_i32().unwrap_or_default();
                Ok(crate::SetOutcome::unchanged())
            });

        assert!(matches!(result, Err(BusdeclError::AccessViolation { .. })));
    }

    #[test]
    fn test_duplicate_members_fail() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface.method("Ping", [], None).unwrap();
        iface.signal("CountChanged", [], None).unwrap();

        let method = iface.method("Ping", [], None).map(|_| ());
        let property = iface
            .property("Count", PropertyDecl::read("i").signal_on_change(true))
            .map(|_| ());

        assert!(matches!(method, Err(BusdeclError::DuplicateMember { kind: "method", .. })));
        assert!(matches!(property, Err(BusdeclError::DuplicateMember { kind: "signal", .. })));
        assert_eq!(iface.serialize().children().len(), 2);
    }

    #[test]
    fn test_empty_response_signature_fails() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");

        let result = iface.method("Echo", [], Some("")).map(|_| ());

        assert!(matches!(
            result,
            Err(BusdeclError::Declaration(DeclarationError::MissingSignature { .. }))
        ));
    }

    #[test]
    fn test_handle_requires_declared_method() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface.method("Ping", [], Some("b")).unwrap();

        assert!(matches!(
            iface.method_handler("Ping"),
            Err(BusdeclError::NotImplemented(_))
        ));
        let unknown = iface.handle("Pong", |_, _| Ok(Value::Unit)).map(|_| ());
        assert!(matches!(unknown, Err(BusdeclError::UnknownMethod(_))));

        iface.handle("Ping", |_, _| Ok(Value::from(true))).unwrap();
        assert!(iface.method_handler("Ping").is_ok());
    }

    #[test]
    fn test_interface_annotation() {
        let mut iface = Interface::<Svc>::new("com.example.Svc");
        iface.annotate(Annotation::deprecated());

        let fragment = iface.serialize();

        assert_eq!(fragment.children()[0].tag(), "annotation");
    }
}
