use crate::encoder::encode;
use crate::error::{BridgeError, Result};
use crate::host::{Parameter, ValueCallback};
use crate::protocol::OscMessage;
use crate::types::{EntityKind, ListenerId, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Sink for messages leaving the bridge
pub trait Outbound: Send + Sync {
    fn send(&self, message: OscMessage);
}

impl Outbound for mpsc::UnboundedSender<OscMessage> {
    fn send(&self, message: OscMessage) {
        if let Err(e) = mpsc::UnboundedSender::send(self, message) {
            tracing::debug!("Outbound channel closed, dropping {}", e.0);
        }
    }
}

/// Receiver for outbound messages (replies and listener notifications)
pub struct OutboundReceiver {
    rx: mpsc::UnboundedReceiver<OscMessage>,
}

impl OutboundReceiver {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<OscMessage>) -> Self {
        Self { rx }
    }

    /// Receive the next outbound message
    ///
    /// Fails with `TransportClosed` once the bridge has been dropped.
    pub async fn recv(&mut self) -> Result<OscMessage> {
        self.rx.recv().await.ok_or(BridgeError::TransportClosed)
    }

    /// Try to receive a message without waiting
    ///
    /// Returns `None` if no message is available.
    pub fn try_recv(&mut self) -> Result<Option<OscMessage>> {
        match self.rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(BridgeError::TransportClosed),
        }
    }

    /// Take every message that is already queued
    pub fn drain(&mut self) -> Vec<OscMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Hashable form of a key argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyArg {
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
    Nil,
}

impl From<&Value> for KeyArg {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(i) => KeyArg::Int(*i),
            Value::Float(f) => KeyArg::Float(f.to_bits()),
            Value::Bool(b) => KeyArg::Bool(*b),
            Value::Str(s) => KeyArg::Str(s.clone()),
            Value::Nil => KeyArg::Nil,
        }
    }
}

/// Uniqueness axis for subscriptions: property plus the exact argument tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    kind: EntityKind,
    property: String,
    params: Vec<KeyArg>,
}

impl ListenerKey {
    /// Key for `property` at `path`, followed by any residual arguments
    pub fn new(kind: EntityKind, property: impl Into<String>, path: &[usize], residual: &[Value]) -> Self {
        let params = path
            .iter()
            .map(|&index| KeyArg::Int(i64::try_from(index).unwrap_or(i64::MAX)))
            .chain(residual.iter().map(KeyArg::from))
            .collect();

        Self {
            kind,
            property: property.into(),
            params,
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.kind, self.property, self.params)
    }
}

/// Where a listener's notifications are sent
#[derive(Debug, Clone)]
pub struct NotifyTarget {
    pub address: String,
    pub path: Vec<usize>,
    pub residual: Vec<Value>,
}

struct ListenerRecord {
    parameter: Arc<dyn Parameter>,
    id: ListenerId,
}

/// Registry of active property subscriptions
///
/// One registry serves every entity kind. At most one record exists per key;
/// subscribing again replaces the previous record. The map is shared between
/// the dispatch loop and host notification threads, so every access goes
/// through one lock.
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<ListenerKey, ListenerRecord>>,
    outbound: Arc<dyn Outbound>,
}

impl ListenerRegistry {
    pub fn new(outbound: Arc<dyn Outbound>) -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            outbound,
        }
    }

    /// Subscribe to `parameter` under `key`, replacing any existing record
    ///
    /// The current value is pushed once before this returns.
    pub fn start_listen(&self, key: ListenerKey, parameter: Arc<dyn Parameter>, target: NotifyTarget) {
        let callback = notification_callback(Arc::downgrade(&parameter), self.outbound.clone(), target);

        {
            let mut listeners = self.listeners.lock();
            if let Some(previous) = listeners.remove(&key) {
                tracing::info!("Replacing listener for {}", key);
                previous.parameter.remove_value_listener(previous.id);
            }

            tracing::info!("Adding listener for {}", key);
            let id = parameter.add_value_listener(callback.clone());
            listeners.insert(key, ListenerRecord { parameter, id });
        }

        callback();
    }

    /// Remove the subscription under `key`
    ///
    /// Returns `false` (and logs a warning) when there was none.
    pub fn stop_listen(&self, key: &ListenerKey) -> bool {
        let removed = self.listeners.lock().remove(key);

        match removed {
            Some(record) => {
                tracing::info!("Removing listener for {}", key);
                record.parameter.remove_value_listener(record.id);
                true
            }
            None => {
                tracing::warn!("No listener function found for {}", key);
                false
            }
        }
    }

    pub fn contains(&self, key: &ListenerKey) -> bool {
        self.listeners.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Unsubscribe everything
    pub fn shutdown(&self) {
        let records: Vec<(ListenerKey, ListenerRecord)> = self.listeners.lock().drain().collect();
        if !records.is_empty() {
            tracing::info!("Removing {} listeners", records.len());
        }
        for (_, record) in records {
            record.parameter.remove_value_listener(record.id);
        }
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn notification_callback(
    parameter: Weak<dyn Parameter>,
    outbound: Arc<dyn Outbound>,
    target: NotifyTarget,
) -> ValueCallback {
    Arc::new(move || {
        // weak so the parameter and its own callback do not keep each other alive
        let Some(parameter) = parameter.upgrade() else {
            return;
        };

        let value = parameter.value();
        tracing::debug!("Property changed {} {:?}: {}", target.address, target.path, value);

        let mut values = target.residual.clone();
        values.push(value);
        if let Some(message) = encode(&target.path, Some(values)).into_message(&target.address) {
            outbound.send(message);
        }
    })
}
