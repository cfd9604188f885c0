//! Bus transport collaborator.
//!
//! Busdecl never opens a connection itself. A [`Transport`] resolves remote
//! methods, delivers remote signals and publishes local objects; applications
//! plug in an implementation backed by their bus library of choice.

use busdecl_core::Value;

use crate::error::{BoxError, BusdeclError};

/// A resolved remote method.
pub type RemoteMethod = Box<dyn Fn(&[Value]) -> Result<Value, BoxError>>;

/// Callback invoked when a remote signal arrives.
pub type SignalHandler = Box<dyn Fn(&[Value]) -> Result<(), BoxError>>;

/// Operations a bus connection provides.
pub trait Transport {
    /// Looks up `method` on the remote `interface`.
    fn resolve_method(&self, method: &str, interface: &str) -> Result<RemoteMethod, BoxError>;

    /// Subscribes `handler` to `signal` on the remote `interface`.
    fn subscribe_signal(&self, interface: &str, signal: &str, handler: SignalHandler) -> Result<(), BoxError>;

    /// Exports `object` under the object `path`.
    fn publish(&self, path: &str, object: &dyn Published) -> Result<(), BoxError>;
}

/// What a transport sees of a published object.
pub trait Published {
    fn interface_name(&self) -> &str;

    /// The introspection document served for the object.
    fn introspection(&self) -> &str;

    /// Reads a property through its getter.
    fn property(&self, name: &str) -> Result<Value, BusdeclError>;
}
