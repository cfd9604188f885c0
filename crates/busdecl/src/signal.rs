//! Signal subscriptions and emission.
//!
//! # Overview
//!
//! - [`SignalBinding`]: ordered subscriber list of one signal on one object
//! - [`Subscription`]: handle returned by `connect`, disconnects explicitly
//! - [`SignalRegistry`]: per-object map of bindings, created on first connect
//! - [`Emitter`]: bound handle of a declared signal
//! - [`PendingSignal`]: a signal a setter asks its caller to emit
//!
//! Emission is synchronous: callbacks run on the emitting thread, in
//! subscription order. The first failing callback aborts the remaining
//! notifications and its error is returned to the emitter.
//!
//! The subscriber list is snapshotted before callbacks run. A callback that
//! connects or disconnects affects only later emissions; a callback that emits
//! the same signal again recurses without a guard.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;
use log::{debug, trace};

use busdecl_core::Value;

use crate::{
    error::{BoxError, BusdeclError},
    object::Object,
};

/// Name of the standard property change notification.
pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

/// Interface that owns [`PROPERTIES_CHANGED`].
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// A subscriber callback.
pub type SignalCallback = Rc<dyn Fn(&[Value]) -> Result<(), BoxError>>;

type Subscribers = RefCell<Vec<(u64, SignalCallback)>>;

/// The subscribers of one signal on one object.
#[derive(Clone)]
pub struct SignalBinding {
    signal: String,
    subscribers: Rc<Subscribers>,
    next_id: Rc<Cell<u64>>,
}

impl SignalBinding {
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            subscribers: Rc::default(),
            next_id: Rc::default(),
        }
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Appends `callback` to the subscriber list.
    pub fn connect<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        debug!(signal = self.signal.as_str(), id; "Subscriber connected");

        Subscription {
            signal: self.signal.clone(),
            subscribers: Rc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Invokes every subscriber in subscription order.
    ///
    /// # Errors
    ///
    /// Returns [`BusdeclError::Subscriber`] with the first callback failure;
    /// later subscribers are not notified.
    pub fn emit(&self, args: &[Value]) -> Result<(), BusdeclError> {
        let snapshot: Vec<SignalCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        trace!(signal = self.signal.as_str(), subscribers = snapshot.len(); "Emitting signal");

        for callback in snapshot {
            callback(args).map_err(|source| BusdeclError::Subscriber {
                signal: self.signal.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SignalBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBinding")
            .field("signal", &self.signal)
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle of one connected callback.
///
/// Dropping the handle leaves the callback connected; call
/// [`disconnect`](Self::disconnect) to remove it.
#[derive(Debug)]
pub struct Subscription {
    signal: String,
    subscribers: Weak<Subscribers>,
    id: u64,
}

impl Subscription {
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Removes the callback. Returns `false` if it was already gone.
    pub fn disconnect(self) -> bool {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return false;
        };
        let mut subscribers = subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != self.id);
        debug!(signal = self.signal.as_str(), id = self.id; "Subscriber disconnected");
        subscribers.len() != before
    }
}

/// Per-object signal bindings, keyed by signal name.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    bindings: RefCell<IndexMap<String, SignalBinding>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `callback` to `signal`, creating the binding on first use.
    pub fn connect<F>(&self, signal: &str, callback: F) -> Subscription
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
    {
        let binding = self
            .bindings
            .borrow_mut()
            .entry(signal.to_string())
            .or_insert_with(|| SignalBinding::new(signal))
            .clone();
        binding.connect(callback)
    }

    /// Emits `signal`. A signal nobody connected to is a no-op.
    pub fn emit(&self, signal: &str, args: &[Value]) -> Result<(), BusdeclError> {
        // Released before callbacks run so they may connect to other signals.
        let binding = self.bindings.borrow().get(signal).cloned();
        match binding {
            Some(binding) => binding.emit(args),
            None => {
                trace!(signal; "No subscribers bound");
                Ok(())
            }
        }
    }

    pub fn subscriber_count(&self, signal: &str) -> usize {
        self.bindings
            .borrow()
            .get(signal)
            .map_or(0, SignalBinding::len)
    }

    /// Whether a binding was ever created for `signal`.
    pub fn is_bound(&self, signal: &str) -> bool {
        self.bindings.borrow().contains_key(signal)
    }
}

/// A signal that a setter asks its caller to emit.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingSignal {
    /// `PropertiesChanged` for the named properties. Values are read from the
    /// getters when the signal is emitted.
    PropertiesChanged {
        changed: Vec<String>,
        invalidated: Vec<String>,
    },
    /// A declared signal with explicit arguments.
    Signal { name: String, args: Vec<Value> },
}

impl PendingSignal {
    pub fn properties_changed<I, S>(changed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::PropertiesChanged {
            changed: changed.into_iter().map(Into::into).collect(),
            invalidated: Vec::new(),
        }
    }

    pub fn invalidated<I, S>(invalidated: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::PropertiesChanged {
            changed: Vec::new(),
            invalidated: invalidated.into_iter().map(Into::into).collect(),
        }
    }

    pub fn signal(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Signal {
            name: name.into(),
            args,
        }
    }
}

/// Bound handle of a declared signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitter {
    signal: String,
}

impl Emitter {
    pub(crate) fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
        }
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Emits this signal on `object`.
    pub fn emit<T>(&self, object: &Object<T>, args: &[Value]) -> Result<(), BusdeclError> {
        object.emit(&self.signal, args)
    }

    /// Connects `callback` to this signal on `object`.
    pub fn connect<T, F>(&self, object: &Object<T>, callback: F) -> Result<Subscription, BusdeclError>
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
    {
        object.connect(&self.signal, callback)
    }

    /// Builds a pending emission of this signal, for returning from a setter.
    pub fn pending(&self, args: Vec<Value>) -> PendingSignal {
        PendingSignal::signal(self.signal.clone(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> SignalCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_factory = Rc::clone(&log);
        let factory = move |label: &str| -> SignalCallback {
            let log = Rc::clone(&log_for_factory);
            let label = label.to_string();
            Rc::new(move |args: &[Value]| -> Result<(), BoxError> {
                log.borrow_mut().push(format!("{label}:{}", args.len()));
                Ok(())
            })
        };
        (log, factory)
    }

    #[test]
    fn test_emit_in_subscription_order() {
        let (log, make) = recorder();
        let binding = SignalBinding::new("Tick");
        let first = make("first");
        let second = make("second");
        let _a = binding.connect(move |args| first(args));
        let _b = binding.connect(move |args| second(args));

        binding.emit(&[Value::from(1i32)]).unwrap();

        assert_eq!(*log.borrow(), ["first:1", "second:1"]);
    }

    #[test]
    fn test_failing_subscriber_aborts_remaining() {
        let (log, make) = recorder();
        let binding = SignalBinding::new("Tick");
        let _a = binding.connect(|_| Err("broken".into()));
        let after = make("after");
        let _b = binding.connect(move |args| after(args));

        let err = binding.emit(&[]).unwrap_err();

        assert!(matches!(err, BusdeclError::Subscriber { ref signal, .. } if signal == "Tick"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_disconnect_removes_callback() {
        let (log, make) = recorder();
        let binding = SignalBinding::new("Tick");
        let kept = make("kept");
        let removed = make("removed");
        let _kept = binding.connect(move |args| kept(args));
        let subscription = binding.connect(move |args| removed(args));

        assert!(subscription.disconnect());
        binding.emit(&[]).unwrap();

        assert_eq!(binding.len(), 1);
        assert_eq!(*log.borrow(), ["kept:0"]);
    }

    #[test]
    fn test_dropping_handle_keeps_subscription() {
        let binding = SignalBinding::new("Tick");
        drop(binding.connect(|_| Ok(())));

        assert_eq!(binding.len(), 1);
    }

    #[test]
    fn test_connect_during_emit_affects_next_emission() {
        let registry = Rc::new(SignalRegistry::new());
        let calls = Rc::new(Cell::new(0));

        let inner_registry = Rc::clone(&registry);
        let inner_calls = Rc::clone(&calls);
        let _s = registry.connect("Tick", move |_| {
            let calls = Rc::clone(&inner_calls);
            let _late = inner_registry.connect("Tick", move |_| {
                calls.set(calls.get() + 100);
                Ok(())
            });
            inner_calls.set(inner_calls.get() + 1);
            Ok(())
        });

        registry.emit("Tick", &[]).unwrap();
        assert_eq!(calls.get(), 1);

        registry.emit("Tick", &[]).unwrap();
        assert_eq!(calls.get(), 102);
    }

    #[test]
    fn test_registry_is_lazy() {
        let registry = SignalRegistry::new();

        assert!(!registry.is_bound("Tick"));
        registry.emit("Tick", &[]).unwrap();
        assert!(!registry.is_bound("Tick"));

        let _s = registry.connect("Tick", |_| Ok(()));
        assert!(registry.is_bound("Tick"));
        assert_eq!(registry.subscriber_count("Tick"), 1);
        assert_eq!(registry.subscriber_count("Other"), 0);
    }

    #[test]
    fn test_pending_signal_constructors() {
        assert_eq!(
            PendingSignal::properties_changed(["Count"]),
            PendingSignal::PropertiesChanged {
                changed: vec!["Count".to_string()],
                invalidated: vec![],
            }
        );
        assert_eq!(
            Emitter::new("CountChanged").pending(vec![Value::from(1i32)]),
            PendingSignal::Signal {
                name: "CountChanged".to_string(),
                args: vec![Value::from(1i32)],
            }
        );
    }
}
