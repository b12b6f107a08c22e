use crate::config::BridgeConfig;
use crate::error::Result;
use crate::host::Song;
use crate::protocol::OscMessage;
use crate::router::{Dispatcher, Router};
use crate::subscription::{ListenerRegistry, Outbound, OutboundReceiver};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Bridge between address-pattern messages and a host object graph
///
/// The `LiveBridge` owns the handler table and the listener registry. Replies
/// and listener notifications leave through the same outbound sink.
pub struct LiveBridge {
    dispatcher: Dispatcher,
    registry: Arc<ListenerRegistry>,
    outbound: Arc<dyn Outbound>,
}

impl LiveBridge {
    /// Create a bridge over `song` with an in-process outbound channel
    ///
    /// # Example
    ///
    /// ```
    /// use live_osc_bridge::memory::{MemorySong, MemoryTrack};
    /// use live_osc_bridge::{BridgeConfig, LiveBridge, OscMessage, Value};
    ///
    /// let song = MemorySong::new().with_track(MemoryTrack::new("Drums")).into_arc();
    /// let (bridge, _outbound) = LiveBridge::new(song, BridgeConfig::default());
    ///
    /// let reply = bridge
    ///     .dispatch(&OscMessage::new("/live/track/get/name").with_arg(0))
    ///     .unwrap();
    /// assert_eq!(reply.args, vec![Value::Int(0), Value::from("Drums")]);
    /// ```
    pub fn new(song: Arc<dyn Song>, config: BridgeConfig) -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Self::with_outbound(song, config, Arc::new(tx));
        (bridge, OutboundReceiver::new(rx))
    }

    /// Create a bridge that sends through a caller-supplied sink
    pub fn with_outbound(song: Arc<dyn Song>, config: BridgeConfig, outbound: Arc<dyn Outbound>) -> Self {
        let registry = Arc::new(ListenerRegistry::new(outbound.clone()));
        let root = config.root.clone();
        let router = Router::new(song, registry.clone(), config);

        let mut dispatcher = Dispatcher::new();
        let count = router.install(&mut dispatcher);
        tracing::info!("Bridge ready with {} addresses under /{}", count, root);

        Self {
            dispatcher,
            registry,
            outbound,
        }
    }

    /// Handle one message and return its reply without sending it
    pub fn dispatch(&self, message: &OscMessage) -> Option<OscMessage> {
        tracing::debug!("Received: {}", message);
        self.dispatcher.dispatch(message)
    }

    /// Handle one message and send its reply, if any, to the outbound sink
    pub fn handle(&self, message: &OscMessage) {
        if let Some(reply) = self.dispatch(message) {
            tracing::debug!("Sending: {}", reply);
            self.outbound.send(reply);
        }
    }

    /// Handle inbound messages until the sending side closes
    ///
    /// # Example
    ///
    /// ```
    /// use live_osc_bridge::memory::{MemorySong, MemoryTrack};
    /// use live_osc_bridge::{BridgeConfig, LiveBridge, OscMessage};
    /// use tokio::sync::mpsc;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let song = MemorySong::new().with_track(MemoryTrack::new("Bass")).into_arc();
    ///     let (bridge, mut outbound) = LiveBridge::new(song, BridgeConfig::default());
    ///
    ///     let (tx, rx) = mpsc::unbounded_channel();
    ///     tx.send(OscMessage::new("/live/track/get/name").with_arg(0))?;
    ///     drop(tx);
    ///
    ///     bridge.serve(rx).await;
    ///     let reply = outbound.recv().await?;
    ///     println!("{}", reply);
    ///     Ok(())
    /// }
    /// ```
    pub async fn serve(&self, mut inbound: mpsc::UnboundedReceiver<OscMessage>) {
        while let Some(message) = inbound.recv().await {
            self.handle(&message);
        }
        tracing::info!("Inbound channel closed");
    }

    /// Number of active subscriptions
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of registered addresses
    pub fn address_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn handles(&self, address: &str) -> bool {
        self.dispatcher.contains(address)
    }

    /// Remove every subscription
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }

    /// Parse `config` as JSON and build a bridge from it
    pub fn from_json_config(song: Arc<dyn Song>, config: &str) -> Result<(Self, OutboundReceiver)> {
        Ok(Self::new(song, BridgeConfig::from_json(config)?))
    }
}
