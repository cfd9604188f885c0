//! Integration tests for declaring a service and using its instances.

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, LazyLock},
};

use busdecl::{
    Access, Annotation, Arg, BoxError, BusdeclError, DeclarationState, InitArgs, Introspector,
    Object, PropertyDecl, Published, RemoteMethod, ServiceType, SetOutcome, SignalHandler,
    Transport, Value, config::IntrospectorConfig, signal::PROPERTIES_CHANGED,
};

#[derive(Debug)]
struct ExampleService {
    count: i32,
}

fn declare() -> Result<Arc<ServiceType<ExampleService>>, BusdeclError> {
    let mut introspector = Introspector::<ExampleService>::new("com.example.service");

    introspector.method("HelloWorld", [], Some("s"))?;
    introspector.handle("HelloWorld", |_, _| Ok(Value::from("Hello!")))?;

    introspector.method("Echo", [Arg::new("message", "s")?.into()], Some("s"))?;
    introspector.handle("Echo", |_, args| Ok(args.first().cloned().unwrap_or_default()))?;

    introspector
        .property("Status", PropertyDecl::read("b"))?
        .getter(|_: &ExampleService| Value::from(true))?;

    introspector
        .property("Count", PropertyDecl::new("i", Access::ReadWrite).signal_on_change(true))?
        .getter(|svc: &ExampleService| Value::from(svc.count))?
        .setter(|svc: &mut ExampleService, value| {
            svc.count = value.as_i32().ok_or("Count takes an int32")?;
            Ok(SetOutcome::properties_changed(["Count"]))
        })?;

    Ok(introspector.close())
}

static EXAMPLE: LazyLock<Arc<ServiceType<ExampleService>>> =
    LazyLock::new(|| declare().expect("example service declares cleanly"));

fn construct() -> Object<ExampleService> {
    EXAMPLE
        .construct(InitArgs::new(), |_| Ok(ExampleService { count: 100 }))
        .expect("construction succeeds")
}

const EXPECTED_DOCUMENT: &str = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node name="com.example.service.ExampleService">
  <interface name="com.example.service.ExampleService">
    <method name="HelloWorld">
      <arg name="response" type="s" direction="out"/>
    </method>
    <method name="Echo">
      <arg name="message" type="s" direction="in"/>
      <arg name="response" type="s" direction="out"/>
    </method>
    <property name="Status" type="b" access="read"/>
    <property name="Count" type="i" access="readwrite">
      <annotation name="org.freedesktop.DBus.Property.EmitsChangedSignal" value="true"/>
    </property>
    <signal name="CountChanged">
      <arg name="value" type="i" direction="out"/>
    </signal>
  </interface>
</node>
"#;

#[test]
fn test_full_document() {
    let object = construct();

    assert_eq!(&**object.introspection(), EXPECTED_DOCUMENT);
}

#[test]
fn test_document_shared_between_instances() {
    let first = construct();
    let second = construct();

    assert_eq!(EXAMPLE.state(), DeclarationState::Materialized);
    assert!(Arc::ptr_eq(first.introspection(), second.introspection()));
}

#[test]
fn test_count_scenario() {
    let mut object = construct();
    let seen: Rc<RefCell<Vec<Vec<Value>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    object
        .connect(PROPERTIES_CHANGED, move |args| {
            sink.borrow_mut().push(args.to_vec());
            Ok(())
        })
        .unwrap();

    assert_eq!(object.get("Count").unwrap(), Value::from(100));
    object.set("Count", 5).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1, "exactly one notification");
    let changed = seen[0][1].as_dict().unwrap();
    assert_eq!(changed.keys().collect::<Vec<_>>(), ["Count"]);
    assert_eq!(changed["Count"], Value::from(5));
    assert_eq!(seen[0][2], Value::Array(Vec::new()));
}

#[test]
fn test_methods_dispatch_to_handlers() {
    let mut object = construct();

    assert_eq!(object.call("HelloWorld", &[]).unwrap(), Value::from("Hello!"));
    assert_eq!(
        object.call("Echo", &[Value::from("test 123")]).unwrap(),
        Value::from("test 123")
    );
}

#[test]
fn test_read_only_property_rejects_writes() {
    let mut object = construct();

    let err = object.set("Status", false).unwrap_err();

    assert!(matches!(err, BusdeclError::AccessViolation { access: Access::Read, .. }));
    assert_eq!(object.get("Status").unwrap(), Value::from(true));
}

#[test]
fn test_reserved_namespace_argument() {
    let args = InitArgs::new().with("namespace", "com.elsewhere");

    let err = EXAMPLE
        .construct(args, |_| Ok(ExampleService { count: 0 }))
        .unwrap_err();

    assert!(matches!(err, BusdeclError::ReservedKeyword(_)));
}

#[test]
fn test_annotations_and_config() {
    struct Legacy;

    let mut introspector = Introspector::<Legacy>::new("org/example")
        .with_config(IntrospectorConfig::new(false, 1).with_type_name("Old"));
    introspector.annotate(Annotation::deprecated());
    introspector
        .method(
            "Fire",
            [
                Arg::new("target", "o").unwrap().into(),
                Annotation::method_no_reply().into(),
            ],
            None,
        )
        .unwrap();
    let service = introspector.close();

    let document = service.introspection();

    assert_eq!(
        &*document,
        concat!(
            "<node name=\"org.example.Old\">\n",
            " <interface name=\"org.example.Old\">\n",
            "  <annotation name=\"org.freedesktop.DBus.Deprecated\" value=\"true\"/>\n",
            "  <method name=\"Fire\">\n",
            "   <arg name=\"target\" type=\"o\" direction=\"in\"/>\n",
            "   <annotation name=\"org.freedesktop.DBus.Method.NoReply\" value=\"true\"/>\n",
            "  </method>\n",
            " </interface>\n",
            "</node>\n",
        )
    );
}

#[derive(Default)]
struct FakeBus {
    published: RefCell<Vec<(String, String, Value)>>,
}

impl Transport for FakeBus {
    fn resolve_method(&self, _method: &str, _interface: &str) -> Result<RemoteMethod, BoxError> {
        Err("not connected".into())
    }

    fn subscribe_signal(&self, _interface: &str, _signal: &str, _handler: SignalHandler) -> Result<(), BoxError> {
        Ok(())
    }

    fn publish(&self, path: &str, object: &dyn Published) -> Result<(), BoxError> {
        let status = object.property("Status")?;
        self.published
            .borrow_mut()
            .push((path.to_string(), object.interface_name().to_string(), status));
        Ok(())
    }
}

#[test]
fn test_publish_through_transport() {
    let bus = FakeBus::default();
    let object = construct();

    let default_path = object.publish(&bus, None).unwrap();
    let custom_path = object.publish(&bus, Some("/custom")).unwrap();

    assert_eq!(default_path, "/com/example/service/ExampleService");
    assert_eq!(custom_path, "/custom");
    let published = bus.published.borrow();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].1, "com.example.service.ExampleService");
    assert_eq!(published[0].2, Value::from(true));
}
