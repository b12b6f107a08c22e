//! Capability surface the bridge needs from the host application's object graph.
//!
//! Entities are handed out as `Arc<dyn ...>` references that are only valid for
//! the duration of a single dispatch. The one exception is [`Parameter`]: the
//! listener registry keeps the parameter accessor alive for as long as a
//! subscription exists.

use crate::error::Result;
use crate::types::{ListenerId, RoutingOption, RoutingSlot, Value};
use std::sync::Arc;

/// Callback fired by a parameter when its value changes
pub type ValueCallback = Arc<dyn Fn() + Send + Sync>;

/// Host-side handle for one property, with native change notification
pub trait Parameter: Send + Sync {
    /// Current value
    fn value(&self) -> Value;

    fn set_value(&self, value: Value) -> Result<()>;

    /// Register a change callback; the returned id removes it again
    fn add_value_listener(&self, callback: ValueCallback) -> ListenerId;

    /// Remove a callback; returns `false` when the id was not registered
    fn remove_value_listener(&self, id: ListenerId) -> bool;
}

/// Named attributes and actions shared by every host object
pub trait LiveObject: Send + Sync {
    fn get(&self, name: &str) -> Result<Value>;

    fn set(&self, name: &str, value: Value) -> Result<()>;

    /// Invoke a named action; `None` means the action returns nothing
    fn call(&self, name: &str, args: &[Value]) -> Result<Option<Vec<Value>>>;

    /// Change-notification accessor for an attribute, if it is observable
    fn observe(&self, name: &str) -> Option<Arc<dyn Parameter>>;
}

/// Root of the object graph
pub trait Song: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn Track>>;

    /// Make `device` the selected device in the song view
    ///
    /// Returns `false` when the host's song view cannot select devices.
    fn select_device(&self, _device: &Arc<dyn Device>) -> bool {
        false
    }
}

pub trait Track: LiveObject {
    fn devices(&self) -> Vec<Arc<dyn Device>>;

    fn clip_slots(&self) -> Vec<Arc<dyn ClipSlot>>;

    /// Arrangement clips; fails for track kinds without an arrangement lane
    fn arrangement_clips(&self) -> Result<Vec<Arc<dyn LiveObject>>>;

    /// Number of take lanes, when the host exposes them
    fn take_lane_count(&self) -> Option<usize> {
        None
    }

    fn mixer_device(&self) -> Arc<dyn MixerDevice>;

    fn view(&self) -> Option<Arc<dyn TrackView>> {
        None
    }

    fn group_track(&self) -> Option<Arc<dyn Track>> {
        None
    }

    fn available_routings(&self, slot: RoutingSlot) -> Vec<RoutingOption>;

    fn routing(&self, slot: RoutingSlot) -> Option<RoutingOption>;

    fn set_routing(&self, slot: RoutingSlot, option: &RoutingOption) -> Result<()>;
}

pub trait Device: LiveObject {
    /// Chains of a rack device; `None` when the device cannot hold chains
    fn chains(&self) -> Option<Vec<Arc<dyn Chain>>> {
        None
    }
}

pub trait Chain: LiveObject {
    fn devices(&self) -> Option<Vec<Arc<dyn Device>>> {
        None
    }
}

pub trait ClipSlot: LiveObject {
    fn clip(&self) -> Option<Arc<dyn LiveObject>>;
}

/// Per-track view state (insert mode, collapse, selection)
pub trait TrackView: LiveObject {
    fn selected_device(&self) -> Option<Arc<dyn Device>>;
}

/// Mixer-like sub-object of a track
pub trait MixerDevice: Send + Sync {
    /// Named parameter (`volume`, `panning`)
    fn parameter(&self, name: &str) -> Option<Arc<dyn Parameter>>;

    fn sends(&self) -> Vec<Arc<dyn Parameter>>;
}

/// Identity comparison for trait-object handles
pub(crate) fn same_object<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
