//! Dispatch Router
//!
//! Every handler comes out of [`Router::build_handler`]: resolve the leading
//! indices, run the verb through the gateway or the listener registry, encode
//! the result. [`Router::install`] walks the descriptor tables and registers
//! one handler per (kind, descriptor, verb).

use crate::config::BridgeConfig;
use crate::descriptor::{descriptors, PropertyDescriptor};
use crate::encoder::{encode, Outcome};
use crate::error::{BridgeError, Result};
use crate::gateway;
use crate::host::Song;
use crate::protocol::{Address, OscMessage, Verb};
use crate::resolver::{self, Resolved};
use crate::subscription::{ListenerKey, ListenerRegistry, NotifyTarget};
use crate::types::{EntityKind, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Handler bound to one address
pub type Handler = Box<dyn Fn(&[Value]) -> Outcome + Send + Sync>;

/// Anything that accepts address handlers
pub trait HandlerTable {
    fn add_handler(&mut self, address: String, handler: Handler);
}

/// Exact-address handler table
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the handler for `message` and build the reply, if any
    ///
    /// The reply goes to the same address the request came in on.
    pub fn dispatch(&self, message: &OscMessage) -> Option<OscMessage> {
        match self.handlers.get(&message.address) {
            Some(handler) => handler(&message.args).into_message(&message.address),
            None => {
                match Address::parse(&message.address) {
                    Some(address) => tracing::warn!("No handler for {} {} on {}", address.kind, address.name, address.root),
                    None => tracing::warn!("Unknown address: {}", message.address),
                }
                None
            }
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.handlers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerTable for Dispatcher {
    fn add_handler(&mut self, address: String, handler: Handler) {
        if self.handlers.insert(address.clone(), handler).is_some() {
            tracing::warn!("Handler for {} replaced", address);
        }
    }
}

/// Shared state every handler closes over
pub struct Router {
    song: Arc<dyn Song>,
    registry: Arc<ListenerRegistry>,
    config: BridgeConfig,
}

impl Router {
    pub fn new(song: Arc<dyn Song>, registry: Arc<ListenerRegistry>, config: BridgeConfig) -> Arc<Self> {
        Arc::new(Self {
            song,
            registry,
            config,
        })
    }

    /// Register a handler for every descriptor and verb; returns the count
    pub fn install<T: HandlerTable + ?Sized>(self: &Arc<Self>, table: &mut T) -> usize {
        let mut count = 0;
        for kind in EntityKind::ALL {
            for descriptor in descriptors(kind) {
                for &verb in descriptor.verbs() {
                    table.add_handler(self.address(kind, descriptor, verb), self.build_handler(kind, descriptor, verb));
                    count += 1;
                }
            }
        }
        tracing::debug!("Registered {} handlers under /{}", count, self.config.root);
        count
    }

    /// The one handler factory shared by every address
    pub fn build_handler(
        self: &Arc<Self>,
        kind: EntityKind,
        descriptor: &'static PropertyDescriptor,
        verb: Verb,
    ) -> Handler {
        let router = Arc::clone(self);
        Box::new(move |args: &[Value]| router.run(kind, descriptor, verb, args))
    }

    fn address(&self, kind: EntityKind, descriptor: &PropertyDescriptor, verb: Verb) -> String {
        Address::new(&self.config.root, kind, descriptor.namespace, verb, descriptor.name).to_string()
    }

    fn run(&self, kind: EntityKind, descriptor: &PropertyDescriptor, verb: Verb, args: &[Value]) -> Outcome {
        let candidates = match resolver::resolve(&*self.song, kind, args, &self.config.wildcard) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Rejected {} {} arguments: {}", kind, descriptor.name, e);
                return Outcome::Silent;
            }
        };

        // wildcard answers with the first target that produces a value
        for candidate in candidates {
            let outcome = match candidate {
                Ok(target) => self.apply(kind, descriptor, verb, &target),
                Err(unresolved) => self.degrade(descriptor, verb, &unresolved.path, unresolved.error),
            };
            if outcome.is_reply() {
                return outcome;
            }
        }

        Outcome::Silent
    }

    fn apply(&self, kind: EntityKind, descriptor: &PropertyDescriptor, verb: Verb, target: &Resolved) -> Outcome {
        let result = match verb {
            Verb::Get => gateway::get(&*self.song, target, descriptor).map(Some),
            Verb::Set => gateway::set(target, descriptor).map(|()| None),
            Verb::Invoke => gateway::invoke(&*self.song, target, descriptor),
            Verb::StartListen => self.start_listen(kind, descriptor, target).map(|()| None),
            Verb::StopListen => {
                let key = ListenerKey::new(kind, descriptor.name, &target.path, &target.residual);
                self.registry.stop_listen(&key);
                Ok(None)
            }
        };

        match result {
            Ok(values) => encode(&target.path, values),
            Err(e) => self.degrade(descriptor, verb, &target.path, e),
        }
    }

    fn start_listen(&self, kind: EntityKind, descriptor: &PropertyDescriptor, target: &Resolved) -> Result<()> {
        let parameter = gateway::accessor(&target.entity, descriptor)?;
        let key = ListenerKey::new(kind, descriptor.name, &target.path, &target.residual);
        let notify = NotifyTarget {
            address: self.address(kind, descriptor, Verb::Get),
            path: target.path.clone(),
            residual: target.residual.clone(),
        };
        self.registry.start_listen(key, parameter, notify);
        Ok(())
    }

    /// Turn a failure into the descriptor's fallback reply, or into silence
    fn degrade(&self, descriptor: &PropertyDescriptor, verb: Verb, path: &[usize], error: BridgeError) -> Outcome {
        if verb != Verb::Set && error.allows_fallback() {
            let outcome = encode(path, descriptor.fallback.values());
            if outcome.is_reply() {
                tracing::debug!("{} {:?} answered with fallback: {}", descriptor.name, path, error);
                return outcome;
            }
        }

        match &error {
            BridgeError::UnknownEnumerationName { .. } => tracing::warn!("{}", error),
            BridgeError::CapabilityMissing(_) if verb == Verb::Set => {
                tracing::warn!("Cannot set {} {:?}: {}", descriptor.name, path, error)
            }
            BridgeError::InvalidArgument(_) | BridgeError::UnknownProperty(_) | BridgeError::Host(_) => {
                tracing::warn!("{} {:?} failed: {}", descriptor.name, path, error)
            }
            _ => tracing::debug!("No result for {} {:?}: {}", descriptor.name, path, error),
        }
        Outcome::Silent
    }
}
