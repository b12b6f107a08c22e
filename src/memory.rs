//! In-memory object graph implementing the host traits.
//!
//! Attributes are seeded from the descriptor tables, so every read-write
//! property the bridge exposes exists on a fresh object. Useful for tests and
//! for running the bridge without a host application attached.

use crate::descriptor::{descriptors, Access, Storage};
use crate::error::{BridgeError, Result};
use crate::host::{
    same_object, Chain, ClipSlot, Device, LiveObject, MixerDevice, Parameter, Song, Track, TrackView,
    ValueCallback,
};
use crate::types::{EntityKind, ListenerId, RoutingOption, RoutingSlot, Value};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Parameter holding a value and its change listeners
pub struct MemoryParameter {
    value: Mutex<Value>,
    listeners: Mutex<Vec<(ListenerId, ValueCallback)>>,
}

impl MemoryParameter {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Mutex::new(value.into()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Parameter for MemoryParameter {
    fn value(&self) -> Value {
        self.value.lock().clone()
    }

    /// Stores the value and notifies listeners if it changed
    fn set_value(&self, value: Value) -> Result<()> {
        {
            let mut current = self.value.lock();
            if *current == value {
                return Ok(());
            }
            *current = value;
        }

        // callbacks run without any lock held
        let callbacks: Vec<ValueCallback> = self.listeners.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback();
        }
        Ok(())
    }

    fn add_value_listener(&self, callback: ValueCallback) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.lock().push((id, callback));
        id
    }

    fn remove_value_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

/// Attribute bag with a fixed set of actions
#[derive(Default)]
pub struct MemoryObject {
    attributes: BTreeMap<String, Arc<MemoryParameter>>,
    actions: Vec<String>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MemoryObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object with every direct attribute and action of `kind`
    pub fn for_kind(kind: EntityKind) -> Self {
        let mut object = Self::new();
        for descriptor in descriptors(kind).iter().filter(|d| d.namespace.is_none()) {
            match (descriptor.access, descriptor.storage) {
                (Access::Action, Storage::Direct) => object = object.with_action(descriptor.name),
                (_, Storage::Direct) => object = object.with_attribute(descriptor.name, 0),
                _ => {}
            }
        }
        object
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes
            .insert(name.to_string(), Arc::new(MemoryParameter::new(value)));
        self
    }

    pub fn with_action(mut self, name: &str) -> Self {
        self.actions.push(name.to_string());
        self
    }

    /// Parameter behind an attribute, for driving changes from the host side
    pub fn attribute(&self, name: &str) -> Option<Arc<MemoryParameter>> {
        self.attributes.get(name).cloned()
    }

    /// Names of actions invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl LiveObject for MemoryObject {
    fn get(&self, name: &str) -> Result<Value> {
        self.attributes
            .get(name)
            .map(|p| p.value())
            .ok_or_else(|| BridgeError::UnknownProperty(name.to_string()))
    }

    fn set(&self, name: &str, value: Value) -> Result<()> {
        self.attributes
            .get(name)
            .ok_or_else(|| BridgeError::UnknownProperty(name.to_string()))?
            .set_value(value)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Option<Vec<Value>>> {
        if !self.actions.iter().any(|action| action == name) {
            return Err(BridgeError::UnknownProperty(name.to_string()));
        }
        self.calls.lock().push((name.to_string(), args.to_vec()));
        Ok(None)
    }

    fn observe(&self, name: &str) -> Option<Arc<dyn Parameter>> {
        self.attributes
            .get(name)
            .map(|p| p.clone() as Arc<dyn Parameter>)
    }
}

macro_rules! delegate_live_object {
    ($($ty:ty),+) => {$(
        impl LiveObject for $ty {
            fn get(&self, name: &str) -> Result<Value> {
                self.object.get(name)
            }

            fn set(&self, name: &str, value: Value) -> Result<()> {
                self.object.set(name, value)
            }

            fn call(&self, name: &str, args: &[Value]) -> Result<Option<Vec<Value>>> {
                self.object.call(name, args)
            }

            fn observe(&self, name: &str) -> Option<Arc<dyn Parameter>> {
                self.object.observe(name)
            }
        }
    )+};
}

/// Root of an in-memory song
#[derive(Default)]
pub struct MemorySong {
    tracks: Vec<Arc<MemoryTrack>>,
}

impl MemorySong {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: MemoryTrack) -> Self {
        self.tracks.push(Arc::new(track));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn track(&self, index: usize) -> Option<Arc<MemoryTrack>> {
        self.tracks.get(index).cloned()
    }

    /// Put track `child` into the group track `parent`
    pub fn group(&self, child: usize, parent: usize) {
        if let (Some(child), Some(parent)) = (self.tracks.get(child), self.tracks.get(parent)) {
            *child.group.lock() = Some(parent.clone() as Arc<dyn Track>);
        }
    }
}

impl Song for MemorySong {
    fn tracks(&self) -> Vec<Arc<dyn Track>> {
        self.tracks.iter().map(|t| t.clone() as Arc<dyn Track>).collect()
    }

    fn select_device(&self, device: &Arc<dyn Device>) -> bool {
        for track in &self.tracks {
            if track.devices.iter().any(|d| same_object(d, device)) {
                if let Some(view) = &track.view {
                    *view.selected.lock() = Some(device.clone());
                    return true;
                }
            }
        }
        false
    }
}

/// Track mixer with volume, panning and sends
pub struct MemoryMixer {
    volume: Arc<MemoryParameter>,
    panning: Arc<MemoryParameter>,
    sends: Vec<Arc<MemoryParameter>>,
}

impl MemoryMixer {
    fn new() -> Self {
        Self {
            volume: Arc::new(MemoryParameter::new(0.85)),
            panning: Arc::new(MemoryParameter::new(0.0)),
            sends: Vec::new(),
        }
    }

    pub fn volume(&self) -> Arc<MemoryParameter> {
        self.volume.clone()
    }

    pub fn panning(&self) -> Arc<MemoryParameter> {
        self.panning.clone()
    }
}

impl MixerDevice for MemoryMixer {
    fn parameter(&self, name: &str) -> Option<Arc<dyn Parameter>> {
        match name {
            "volume" => Some(self.volume.clone()),
            "panning" => Some(self.panning.clone()),
            _ => None,
        }
    }

    fn sends(&self) -> Vec<Arc<dyn Parameter>> {
        self.sends.iter().map(|s| s.clone() as Arc<dyn Parameter>).collect()
    }
}

#[derive(Default)]
struct Routing {
    available: Vec<RoutingOption>,
    current: Option<RoutingOption>,
}

pub struct MemoryTrack {
    object: MemoryObject,
    devices: Vec<Arc<MemoryDevice>>,
    clip_slots: Vec<Arc<MemoryClipSlot>>,
    arrangement_clips: Option<Vec<Arc<MemoryObject>>>,
    take_lanes: Option<usize>,
    mixer: Arc<MemoryMixer>,
    view: Option<Arc<MemoryTrackView>>,
    group: Mutex<Option<Arc<dyn Track>>>,
    routings: Mutex<HashMap<RoutingSlot, Routing>>,
}

impl MemoryTrack {
    pub fn new(name: &str) -> Self {
        Self {
            object: MemoryObject::for_kind(EntityKind::Track).with_attribute("name", name),
            devices: Vec::new(),
            clip_slots: Vec::new(),
            arrangement_clips: Some(Vec::new()),
            take_lanes: None,
            mixer: Arc::new(MemoryMixer::new()),
            view: Some(Arc::new(MemoryTrackView::new())),
            group: Mutex::new(None),
            routings: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_device(mut self, device: MemoryDevice) -> Self {
        self.devices.push(Arc::new(device));
        self
    }

    /// Append a clip slot, holding a clip named `clip` when given
    pub fn with_clip_slot<S: Into<String>>(mut self, clip: Option<S>) -> Self {
        let clip = clip.map(|name| Arc::new(clip_object(&name.into(), 0.0, 4.0)));
        self.clip_slots.push(Arc::new(MemoryClipSlot::new(clip)));
        self
    }

    pub fn with_arrangement_clip(mut self, name: &str, start_time: f64, end_time: f64) -> Self {
        let clip = Arc::new(clip_object(name, start_time, end_time));
        self.arrangement_clips.get_or_insert_with(Vec::new).push(clip);
        self
    }

    /// Track kind without an arrangement lane (group, return)
    pub fn without_arrangement(mut self) -> Self {
        self.arrangement_clips = None;
        self
    }

    pub fn with_take_lanes(mut self, count: usize) -> Self {
        self.take_lanes = Some(count);
        self
    }

    pub fn without_view(mut self) -> Self {
        self.view = None;
        self
    }

    pub fn with_sends(mut self, count: usize) -> Self {
        let mixer = MemoryMixer {
            volume: self.mixer.volume.clone(),
            panning: self.mixer.panning.clone(),
            sends: (0..count).map(|_| Arc::new(MemoryParameter::new(0.0))).collect(),
        };
        self.mixer = Arc::new(mixer);
        self
    }

    /// Available options for `slot`; the first one becomes current
    pub fn with_routings(self, slot: RoutingSlot, options: Vec<RoutingOption>) -> Self {
        let current = options.first().cloned();
        self.routings.lock().insert(
            slot,
            Routing {
                available: options,
                current,
            },
        );
        self
    }

    pub fn object(&self) -> &MemoryObject {
        &self.object
    }

    pub fn mixer(&self) -> Arc<MemoryMixer> {
        self.mixer.clone()
    }

    pub fn device(&self, index: usize) -> Option<Arc<MemoryDevice>> {
        self.devices.get(index).cloned()
    }

    pub fn clip_slot(&self, index: usize) -> Option<Arc<MemoryClipSlot>> {
        self.clip_slots.get(index).cloned()
    }
}

delegate_live_object!(MemoryTrack);

impl Track for MemoryTrack {
    fn devices(&self) -> Vec<Arc<dyn Device>> {
        self.devices.iter().map(|d| d.clone() as Arc<dyn Device>).collect()
    }

    fn clip_slots(&self) -> Vec<Arc<dyn ClipSlot>> {
        self.clip_slots.iter().map(|s| s.clone() as Arc<dyn ClipSlot>).collect()
    }

    fn arrangement_clips(&self) -> Result<Vec<Arc<dyn LiveObject>>> {
        self.arrangement_clips
            .as_ref()
            .map(|clips| clips.iter().map(|c| c.clone() as Arc<dyn LiveObject>).collect())
            .ok_or_else(|| BridgeError::Host("track has no arrangement clips".to_string()))
    }

    fn take_lane_count(&self) -> Option<usize> {
        self.take_lanes
    }

    fn mixer_device(&self) -> Arc<dyn MixerDevice> {
        self.mixer.clone()
    }

    fn view(&self) -> Option<Arc<dyn TrackView>> {
        self.view.clone().map(|v| v as Arc<dyn TrackView>)
    }

    fn group_track(&self) -> Option<Arc<dyn Track>> {
        self.group.lock().clone()
    }

    fn available_routings(&self, slot: RoutingSlot) -> Vec<RoutingOption> {
        self.routings
            .lock()
            .get(&slot)
            .map(|r| r.available.clone())
            .unwrap_or_default()
    }

    fn routing(&self, slot: RoutingSlot) -> Option<RoutingOption> {
        self.routings.lock().get(&slot).and_then(|r| r.current.clone())
    }

    fn set_routing(&self, slot: RoutingSlot, option: &RoutingOption) -> Result<()> {
        self.routings.lock().entry(slot).or_default().current = Some(option.clone());
        Ok(())
    }
}

/// Track view with insert mode, collapse state and device selection
pub struct MemoryTrackView {
    object: MemoryObject,
    selected: Mutex<Option<Arc<dyn Device>>>,
}

impl MemoryTrackView {
    fn new() -> Self {
        Self {
            object: MemoryObject::new()
                .with_attribute("device_insert_mode", 0)
                .with_attribute("is_collapsed", 0),
            selected: Mutex::new(None),
        }
    }
}

impl LiveObject for MemoryTrackView {
    fn get(&self, name: &str) -> Result<Value> {
        self.object.get(name)
    }

    fn set(&self, name: &str, value: Value) -> Result<()> {
        self.object.set(name, value)
    }

    fn call(&self, name: &str, _args: &[Value]) -> Result<Option<Vec<Value>>> {
        match name {
            "select_instrument" => Ok(Some(vec![Value::Bool(self.selected.lock().is_some())])),
            _ => Err(BridgeError::UnknownProperty(name.to_string())),
        }
    }

    fn observe(&self, name: &str) -> Option<Arc<dyn Parameter>> {
        self.object.observe(name)
    }
}

impl TrackView for MemoryTrackView {
    fn selected_device(&self) -> Option<Arc<dyn Device>> {
        self.selected.lock().clone()
    }
}

pub struct MemoryDevice {
    object: MemoryObject,
    chains: Option<Vec<Arc<MemoryChain>>>,
}

impl MemoryDevice {
    /// Plain device without chain support
    pub fn new(name: &str) -> Self {
        Self {
            object: MemoryObject::for_kind(EntityKind::Device)
                .with_attribute("name", name)
                .with_attribute("class_name", name)
                .with_attribute("can_have_chains", false)
                .with_attribute("is_active", true),
            chains: None,
        }
    }

    /// Rack device that holds chains
    pub fn rack(name: &str) -> Self {
        Self {
            object: MemoryObject::for_kind(EntityKind::Device)
                .with_attribute("name", name)
                .with_attribute("class_name", "AudioEffectGroupDevice")
                .with_attribute("can_have_chains", true)
                .with_attribute("is_active", true),
            chains: Some(Vec::new()),
        }
    }

    pub fn with_chain(mut self, chain: MemoryChain) -> Self {
        self.chains.get_or_insert_with(Vec::new).push(Arc::new(chain));
        self
    }

    pub fn object(&self) -> &MemoryObject {
        &self.object
    }

    pub fn chain(&self, index: usize) -> Option<Arc<MemoryChain>> {
        self.chains.as_ref()?.get(index).cloned()
    }
}

delegate_live_object!(MemoryDevice);

impl Device for MemoryDevice {
    fn chains(&self) -> Option<Vec<Arc<dyn Chain>>> {
        self.chains
            .as_ref()
            .map(|chains| chains.iter().map(|c| c.clone() as Arc<dyn Chain>).collect())
    }
}

pub struct MemoryChain {
    object: MemoryObject,
    devices: Option<Vec<Arc<MemoryDevice>>>,
}

impl MemoryChain {
    pub fn new(name: &str) -> Self {
        Self {
            object: MemoryObject::for_kind(EntityKind::Chain).with_attribute("name", name),
            devices: Some(Vec::new()),
        }
    }

    pub fn with_device(mut self, device: MemoryDevice) -> Self {
        self.devices.get_or_insert_with(Vec::new).push(Arc::new(device));
        self
    }

    /// Chain that does not expose a device list
    pub fn without_devices(mut self) -> Self {
        self.devices = None;
        self
    }

    pub fn object(&self) -> &MemoryObject {
        &self.object
    }
}

delegate_live_object!(MemoryChain);

impl Chain for MemoryChain {
    fn devices(&self) -> Option<Vec<Arc<dyn Device>>> {
        self.devices
            .as_ref()
            .map(|devices| devices.iter().map(|d| d.clone() as Arc<dyn Device>).collect())
    }
}

pub struct MemoryClipSlot {
    clip: Mutex<Option<Arc<MemoryObject>>>,
}

impl MemoryClipSlot {
    fn new(clip: Option<Arc<MemoryObject>>) -> Self {
        Self { clip: Mutex::new(clip) }
    }

    pub fn has_clip(&self) -> bool {
        self.clip.lock().is_some()
    }
}

impl LiveObject for MemoryClipSlot {
    fn get(&self, name: &str) -> Result<Value> {
        match name {
            "has_clip" => Ok(Value::Bool(self.has_clip())),
            _ => Err(BridgeError::UnknownProperty(name.to_string())),
        }
    }

    fn set(&self, name: &str, _value: Value) -> Result<()> {
        Err(BridgeError::UnknownProperty(name.to_string()))
    }

    fn call(&self, name: &str, _args: &[Value]) -> Result<Option<Vec<Value>>> {
        match name {
            "delete_clip" => {
                *self.clip.lock() = None;
                Ok(None)
            }
            _ => Err(BridgeError::UnknownProperty(name.to_string())),
        }
    }

    fn observe(&self, _name: &str) -> Option<Arc<dyn Parameter>> {
        None
    }
}

impl ClipSlot for MemoryClipSlot {
    fn clip(&self) -> Option<Arc<dyn LiveObject>> {
        self.clip.lock().clone().map(|c| c as Arc<dyn LiveObject>)
    }
}

fn clip_object(name: &str, start_time: f64, end_time: f64) -> MemoryObject {
    MemoryObject::new()
        .with_attribute("name", name)
        .with_attribute("length", end_time - start_time)
        .with_attribute("color", 0)
        .with_attribute("start_time", start_time)
        .with_attribute("end_time", end_time)
        .with_attribute("muted", false)
}
