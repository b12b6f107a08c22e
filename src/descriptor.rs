//! Property Descriptor Table
//!
//! Static configuration listing, per entity kind, which property and action
//! names exist, how they are accessed, and where they live. The router builds
//! every handler from these tables; adding a property means adding a row here.

use crate::protocol::Verb;
use crate::types::{Collection, EntityKind, RoutingSlot, Value};

/// How a descriptor may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
    Action,
}

/// Where the value behind a descriptor is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Named attribute (or action) on the entity itself
    Direct,
    /// Parameter object on the track's mixer device, accessed through `.value`
    Mixer,
    /// Indexed mixer send; the first residual argument selects the send
    Send,
    /// Routing selection matched by display name
    Routing(RoutingSlot),
    /// Attribute or action on the track view
    View,
    /// Action on an indexed clip slot; the first residual argument selects it
    ClipSlot,
    /// Device selection through the song view
    SongView,
    /// Read-only value computed from the entity's collections
    Query(Query),
}

/// Computed read-only queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Length of a collection
    Count(Collection),
    /// One attribute of every member of a collection
    Each(Collection, &'static str),
    /// Display names of the available routing options
    AvailableRoutings(RoutingSlot),
    GroupTrackName,
    GroupTrackIndex,
    /// Index of the view's selected device among the track's devices
    SelectedDevice,
}

/// Value answered when an optional capability is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// No reply at all
    Silent,
    Zero,
    /// `-1`, meaning "nothing selected"
    NoSelection,
    /// Empty result tuple
    Empty,
}

impl Fallback {
    /// Result values for this fallback; `None` for silence
    pub fn values(self) -> Option<Vec<Value>> {
        match self {
            Fallback::Silent => None,
            Fallback::Zero => Some(vec![Value::Int(0)]),
            Fallback::NoSelection => Some(vec![Value::Int(-1)]),
            Fallback::Empty => Some(Vec::new()),
        }
    }
}

/// One row of the descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub access: Access,
    pub storage: Storage,
    pub fallback: Fallback,
    /// Extra address segment between the kind and the verb (`view`)
    pub namespace: Option<&'static str>,
}

impl PropertyDescriptor {
    const fn new(name: &'static str, access: Access) -> Self {
        Self {
            name,
            access,
            storage: Storage::Direct,
            fallback: Fallback::Silent,
            namespace: None,
        }
    }

    pub const fn read(name: &'static str) -> Self {
        Self::new(name, Access::Read)
    }

    pub const fn read_write(name: &'static str) -> Self {
        Self::new(name, Access::ReadWrite)
    }

    pub const fn action(name: &'static str) -> Self {
        Self::new(name, Access::Action)
    }

    pub const fn query(name: &'static str, query: Query) -> Self {
        Self::new(name, Access::Read).stored(Storage::Query(query))
    }

    pub const fn stored(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    pub const fn or_else(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub const fn in_view(mut self) -> Self {
        self.namespace = Some("view");
        self
    }

    /// Whether a native change notification can back a subscription
    pub fn is_listenable(&self) -> bool {
        self.access != Access::Action && matches!(self.storage, Storage::Direct | Storage::Mixer)
    }

    /// Address verbs this descriptor is registered under
    pub fn verbs(&self) -> &'static [Verb] {
        match (self.access, self.is_listenable()) {
            (Access::Action, _) => &[Verb::Invoke],
            (Access::Read, true) => &[Verb::Get, Verb::StartListen, Verb::StopListen],
            (Access::Read, false) => &[Verb::Get],
            (Access::ReadWrite, true) => &[Verb::Get, Verb::Set, Verb::StartListen, Verb::StopListen],
            (Access::ReadWrite, false) => &[Verb::Get, Verb::Set],
        }
    }
}

use PropertyDescriptor as P;

const TRACK: &[PropertyDescriptor] = &[
    // actions
    P::action("create_audio_clip"),
    P::action("create_midi_clip"),
    P::action("create_take_lane"),
    P::action("delete_device"),
    P::action("duplicate_clip_slot"),
    P::action("duplicate_clip_to_arrangement"),
    P::action("jump_in_running_session_clip"),
    P::action("stop_all_clips"),
    P::action("delete_clip").stored(Storage::ClipSlot),
    // read-only attributes
    P::read("can_be_armed"),
    P::read("can_be_frozen"),
    P::read("can_show_chains"),
    P::read("fired_slot_index"),
    P::read("has_audio_input"),
    P::read("has_audio_output"),
    P::read("has_midi_input"),
    P::read("has_midi_output"),
    P::read("is_foldable"),
    P::read("is_frozen"),
    P::read("is_grouped"),
    P::read("is_part_of_selection"),
    P::read("is_visible"),
    P::read("muted_via_solo"),
    P::read("output_meter_level"),
    P::read("output_meter_left"),
    P::read("output_meter_right"),
    P::read("performance_impact"),
    P::read("playing_slot_index"),
    // read-write attributes
    P::read_write("arm"),
    P::read_write("back_to_arranger"),
    P::read_write("color"),
    P::read_write("color_index"),
    P::read_write("current_monitoring_state"),
    P::read_write("fold_state"),
    P::read_write("implicit_arm"),
    P::read_write("input_meter_left"),
    P::read_write("input_meter_level"),
    P::read_write("input_meter_right"),
    P::read_write("is_showing_chains"),
    P::read_write("mute"),
    P::read_write("name"),
    P::read_write("solo"),
    // mixer
    P::read_write("volume").stored(Storage::Mixer),
    P::read_write("panning").stored(Storage::Mixer),
    P::read_write("send").stored(Storage::Send),
    // collections
    P::query("clips/name", Query::Each(Collection::ClipSlots, "name")),
    P::query("clips/length", Query::Each(Collection::ClipSlots, "length")),
    P::query("clips/color", Query::Each(Collection::ClipSlots, "color")),
    P::query("arrangement_clips/name", Query::Each(Collection::ArrangementClips, "name")).or_else(Fallback::Empty),
    P::query("arrangement_clips/length", Query::Each(Collection::ArrangementClips, "length")).or_else(Fallback::Empty),
    P::query("arrangement_clips/start_time", Query::Each(Collection::ArrangementClips, "start_time"))
        .or_else(Fallback::Empty),
    P::query("arrangement_clips/end_time", Query::Each(Collection::ArrangementClips, "end_time")).or_else(Fallback::Empty),
    P::query("arrangement_clips/muted", Query::Each(Collection::ArrangementClips, "muted")).or_else(Fallback::Empty),
    P::query("num_devices", Query::Count(Collection::Devices)),
    P::query("devices/name", Query::Each(Collection::Devices, "name")),
    P::query("devices/type", Query::Each(Collection::Devices, "type")),
    P::query("devices/class_name", Query::Each(Collection::Devices, "class_name")),
    P::query("devices/can_have_chains", Query::Each(Collection::Devices, "can_have_chains")),
    P::query("num_clip_slots", Query::Count(Collection::ClipSlots)),
    P::query("num_arrangement_clips", Query::Count(Collection::ArrangementClips)).or_else(Fallback::Zero),
    P::query("num_take_lanes", Query::Count(Collection::TakeLanes)).or_else(Fallback::Zero),
    P::query("group_track", Query::GroupTrackName),
    P::query("group_track_index", Query::GroupTrackIndex),
    // routing
    P::query("available_output_routing_types", Query::AvailableRoutings(RoutingSlot::OutputType)),
    P::query("available_output_routing_channels", Query::AvailableRoutings(RoutingSlot::OutputChannel)),
    P::query("available_input_routing_types", Query::AvailableRoutings(RoutingSlot::InputType)),
    P::query("available_input_routing_channels", Query::AvailableRoutings(RoutingSlot::InputChannel)),
    P::read_write("output_routing_type").stored(Storage::Routing(RoutingSlot::OutputType)),
    P::read_write("output_routing_channel").stored(Storage::Routing(RoutingSlot::OutputChannel)),
    P::read_write("input_routing_type").stored(Storage::Routing(RoutingSlot::InputType)),
    P::read_write("input_routing_channel").stored(Storage::Routing(RoutingSlot::InputChannel)),
    // view
    P::read_write("device_insert_mode").stored(Storage::View).or_else(Fallback::Zero).in_view(),
    P::read_write("is_collapsed").stored(Storage::View).or_else(Fallback::Zero).in_view(),
    P::query("selected_device", Query::SelectedDevice).or_else(Fallback::NoSelection).in_view(),
    P::action("select_instrument").stored(Storage::View).or_else(Fallback::Zero).in_view(),
    P::action("select_device").stored(Storage::SongView).or_else(Fallback::Zero).in_view(),
];

const DEVICE: &[PropertyDescriptor] = &[
    P::read("name"),
    P::read("class_name"),
    P::read("type"),
    P::read("can_have_chains"),
    P::read_write("is_active"),
    P::query("num_chains", Query::Count(Collection::Chains)).or_else(Fallback::Zero),
];

const CHAIN: &[PropertyDescriptor] = &[
    P::read("color"),
    P::read("color_index"),
    P::read_write("name"),
    P::read_write("mute"),
    P::read_write("solo"),
    P::query("num_devices", Query::Count(Collection::ChainDevices)).or_else(Fallback::Zero),
];

const CHAIN_DEVICE: &[PropertyDescriptor] = &[P::read("name"), P::read("class_name"), P::read("type")];

/// Descriptor table for an entity kind
pub fn descriptors(kind: EntityKind) -> &'static [PropertyDescriptor] {
    match kind {
        EntityKind::Track => TRACK,
        EntityKind::Device => DEVICE,
        EntityKind::Chain => CHAIN,
        EntityKind::ChainDevice => CHAIN_DEVICE,
    }
}

/// Look up one descriptor by namespace and name
pub fn find(kind: EntityKind, namespace: Option<&str>, name: &str) -> Option<&'static PropertyDescriptor> {
    descriptors(kind)
        .iter()
        .find(|d| d.name == name && d.namespace == namespace)
}
