//! Rust library for bridging OSC-style address messages to a live track/device object graph
//!
//! This library maps messages such as `/live/track/get/volume 0` onto a host
//! application's object graph of tracks, devices, rack chains and devices nested
//! inside chains. It supports:
//!
//! - Get, set and invoke for every property in the descriptor tables
//! - Change subscriptions with an initial push and deduplication per argument tuple
//! - A track wildcard answered by the first track that produces a result
//! - Fallback replies when optional capabilities (chains, take lanes) are missing
//! - Routing selection by display name
//! - An in-memory object graph for tests and offline use
//!
//! # Quick Start
//!
//! ```
//! use live_osc_bridge::memory::{MemoryDevice, MemorySong, MemoryTrack};
//! use live_osc_bridge::{BridgeConfig, LiveBridge, OscMessage, Value};
//!
//! let song = MemorySong::new()
//!     .with_track(MemoryTrack::new("Keys").with_device(MemoryDevice::new("Operator")))
//!     .into_arc();
//! let (bridge, mut outbound) = LiveBridge::new(song, BridgeConfig::default());
//!
//! // Operator has no chains, so the count falls back to zero
//! let reply = bridge
//!     .dispatch(&OscMessage::new("/live/device/get/num_chains").with_arg(0).with_arg(0))
//!     .unwrap();
//! assert_eq!(reply.args, vec![Value::Int(0), Value::Int(0), Value::Int(0)]);
//!
//! // Subscribing pushes the current value once
//! bridge.handle(&OscMessage::new("/live/track/start_listen/volume").with_arg(0));
//! let pushed = outbound.try_recv().unwrap().unwrap();
//! assert_eq!(pushed.address, "/live/track/get/volume");
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Bridge**: Entry point owning the handler table and the listener registry
//! - **Router**: One handler factory registered for every (kind, property, verb)
//! - **Resolver**: Leading integer arguments to an entity, with wildcard expansion
//! - **Gateway**: Property access by storage (direct, mixer, send, routing, view)
//! - **Subscription**: Listener registry and outbound notifications
//! - **Descriptor**: Static per-kind property tables
//! - **Host**: Traits the host object graph implements
//! - **Protocol**: Messages and address layout
//! - **Types**: Domain types and data structures

mod bridge;
mod config;
pub mod descriptor;
mod encoder;
mod error;
mod gateway;
pub mod host;
pub mod memory;
mod protocol;
mod resolver;
mod router;
mod subscription;
mod types;

// Public exports
pub use bridge::LiveBridge;
pub use config::BridgeConfig;
pub use encoder::Outcome;
pub use error::{BridgeError, Result};
pub use protocol::{Address, OscMessage, Verb};
pub use resolver::{Candidate, Entity, Resolved, Unresolved};
pub use router::{Dispatcher, Handler, HandlerTable, Router};
pub use subscription::{ListenerKey, ListenerRegistry, NotifyTarget, Outbound, OutboundReceiver};
pub use types::{Collection, EntityKind, ListenerId, RoutingOption, RoutingSlot, Value};
