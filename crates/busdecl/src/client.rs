//! Client-side access to a remote service.

use log::debug;

use busdecl_core::{
    Value,
    path::{join_path, service_path},
};

use crate::{
    error::{BoxError, BusdeclError},
    transport::{RemoteMethod, Transport},
};

/// Calls methods and subscribes to signals of one remote service.
///
/// Interface names are resolved relative to the service name: the interface
/// suffix `Message` on service `com.example.service` addresses
/// `com.example.service.Message`, and an empty suffix addresses the service
/// name itself.
#[derive(Debug)]
pub struct Proxy<'t, Tr: ?Sized> {
    transport: &'t Tr,
    service_name: String,
    path: String,
}

impl<'t, Tr> Proxy<'t, Tr>
where
    Tr: Transport + ?Sized,
{
    /// Creates a proxy. Without an explicit `path` the object path is derived
    /// from the service name.
    pub fn new(transport: &'t Tr, service_name: &str, path: Option<&str>) -> Self {
        let path = path.map_or_else(|| service_path(service_name), str::to_string);
        Self {
            transport,
            service_name: service_name.to_string(),
            path,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full interface name for an interface suffix.
    pub fn interface_name(&self, interface: &str) -> String {
        join_path([self.service_name.as_str(), interface])
    }

    /// Resolves a remote method.
    pub fn method(&self, method: &str, interface: &str) -> Result<RemoteMethod, BusdeclError> {
        let interface = self.interface_name(interface);
        debug!(service = self.service_name.as_str(), interface = interface.as_str(), method; "Resolving remote method");
        self.transport
            .resolve_method(method, &interface)
            .map_err(BusdeclError::Transport)
    }

    /// Resolves and invokes a remote method.
    pub fn call(&self, method: &str, interface: &str, args: &[Value]) -> Result<Value, BusdeclError> {
        let remote = self.method(method, interface)?;
        remote(args).map_err(|source| BusdeclError::Handler {
            member: method.to_string(),
            source,
        })
    }

    /// Subscribes to a remote signal.
    pub fn subscribe<F>(&self, interface: &str, signal: &str, handler: F) -> Result<(), BusdeclError>
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
    {
        let interface = self.interface_name(interface);
        self.transport
            .subscribe_signal(&interface, signal, Box::new(handler))
            .map_err(BusdeclError::Transport)
    }
}
