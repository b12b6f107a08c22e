//! Shared fixtures for the integration tests

#![allow(dead_code)]

use live_osc_bridge::memory::{MemoryChain, MemoryDevice, MemorySong, MemoryTrack};
use live_osc_bridge::{BridgeConfig, LiveBridge, OscMessage, OutboundReceiver, RoutingOption, RoutingSlot, Value};
use std::sync::Arc;

/// Three tracks:
///
/// - 0 "Drums": rack with chains "Kick" (EQ, Reverb) and "Snare" (empty),
///   two sends, output routing, two clip slots and one arrangement clip
/// - 1 "Bass": a plain Operator, no arrangement lane
/// - 2 "Keys": Wavetable and Chorus
pub fn fixture_song() -> Arc<MemorySong> {
    let rack = MemoryDevice::rack("Drum Rack")
        .with_chain(
            MemoryChain::new("Kick")
                .with_device(MemoryDevice::new("EQ"))
                .with_device(MemoryDevice::new("Reverb")),
        )
        .with_chain(MemoryChain::new("Snare"));

    let drums = MemoryTrack::new("Drums")
        .with_device(rack)
        .with_sends(2)
        .with_routings(
            RoutingSlot::OutputType,
            vec![RoutingOption::new("Master", 1), RoutingOption::new("Sends Only", 2)],
        )
        .with_clip_slot(Some("Intro"))
        .with_clip_slot(None::<&str>)
        .with_arrangement_clip("Verse", 0.0, 16.0);

    let bass = MemoryTrack::new("Bass")
        .with_device(MemoryDevice::new("Operator"))
        .without_arrangement();

    let keys = MemoryTrack::new("Keys")
        .with_device(MemoryDevice::new("Wavetable"))
        .with_device(MemoryDevice::new("Chorus"))
        .with_take_lanes(2);

    MemorySong::new()
        .with_track(drums)
        .with_track(bass)
        .with_track(keys)
        .into_arc()
}

pub fn bridge(song: &Arc<MemorySong>) -> (LiveBridge, OutboundReceiver) {
    init_tracing();
    LiveBridge::new(song.clone(), BridgeConfig::default())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a message from an address and integer/str arguments
pub fn msg(address: &str, args: Vec<Value>) -> OscMessage {
    OscMessage::new(address).with_args(args)
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Int(v)).collect()
}
