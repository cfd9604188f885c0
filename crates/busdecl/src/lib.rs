//! Busdecl - declare D-Bus methods, properties and signals next to their
//! implementation.
//!
//! Members are registered on an [`Introspector`] while a service type is
//! being assembled. Closing the introspector fixes the interface name and
//! yields a shared [`ServiceType`]; constructing the first [`Object`] renders
//! the introspection document, which every later instance reuses.
//!
//! Property access, method calls and signal emission go through [`Object`].
//! Talking to an actual bus is left to a [`Transport`] implementation.
//!
//! # Example
//!
//! ```
//! use busdecl::{InitArgs, Introspector, PropertyDecl, SetOutcome, Value};
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! let mut introspector = Introspector::<Counter>::new("com.example.Svc");
//! introspector
//!     .property("Count", PropertyDecl::read_write("i").signal_on_change(true))?
//!     .getter(|c: &Counter| Value::from(c.count))?
//!     .setter(|c: &mut Counter, value| {
//!         c.count = value.as_i32().ok_or("expected an int32")?;
//!         Ok(SetOutcome::properties_changed(["Count"]))
//!     })?;
//!
//! let service = introspector.close();
//! let mut counter = service.construct(InitArgs::new(), |_| Ok(Counter { count: 100 }))?;
//!
//! counter.set("Count", 5)?;
//! assert_eq!(counter.get("Count")?, Value::from(5));
//! # Ok::<(), busdecl::BusdeclError>(())
//! ```

pub mod client;
pub mod config;
pub mod interface;
pub mod introspector;
pub mod object;
pub mod property;
pub mod signal;
pub mod transport;

mod error;

pub use busdecl_core::{
    Access, Annotation, Arg, AttributeValue, DeclarationError, Direction, Document,
    ElementKind, ElementNode, ElementNodeGroup, EmitsChangedSignal, Fragment, MemberChild,
    Value, WellKnown, path,
};

pub use client::Proxy;
pub use error::{BoxError, BusdeclError};
pub use interface::{Interface, MethodHandler};
pub use introspector::{DeclarationState, InitArgs, Introspector, ServiceType};
pub use object::Object;
pub use property::{PropertyBuilder, PropertyDecl, PropertyDescriptor, SetOutcome};
pub use signal::{Emitter, PendingSignal, SignalBinding, SignalRegistry, Subscription};
pub use transport::{Published, RemoteMethod, SignalHandler, Transport};
