//! End-to-end dispatch tests against the in-memory object graph

mod helpers;

use helpers::{bridge, fixture_song, ints, msg};
use live_osc_bridge::descriptor::{descriptors, Access, Storage};
use live_osc_bridge::host::LiveObject;
use live_osc_bridge::memory::{MemoryChain, MemoryDevice, MemorySong, MemoryTrack};
use live_osc_bridge::{Address, EntityKind, Value, Verb};
use rstest::rstest;
use std::sync::Arc;

fn with(mut prefix: Vec<Value>, tail: Vec<Value>) -> Vec<Value> {
    prefix.extend(tail);
    prefix
}

/// Counts on entities without the optional collection answer zero
#[rstest]
#[case("/live/device/get/num_chains", &[1, 0], &[1, 0, 0])]
#[case("/live/chain/get/num_devices", &[1, 0, 0], &[1, 0, 0, 0])]
#[case("/live/track/get/num_take_lanes", &[0], &[0, 0])]
#[case("/live/track/get/num_take_lanes", &[2], &[2, 2])]
#[case("/live/track/get/num_arrangement_clips", &[1], &[1, 0])]
#[case("/live/track/get/num_arrangement_clips", &[0], &[0, 1])]
#[case("/live/device/get/num_chains", &[0, 0], &[0, 0, 2])]
#[case("/live/chain/get/num_devices", &[0, 0, 0], &[0, 0, 0, 2])]
#[case("/live/chain/get/num_devices", &[0, 0, 1], &[0, 0, 1, 0])]
fn test_counts_with_fallback(#[case] address: &str, #[case] args: &[i64], #[case] expected: &[i64]) {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge.dispatch(&msg(address, ints(args))).expect("expected a reply");
    assert_eq!(reply.address, address);
    assert_eq!(reply.args, ints(expected));
}

/// Return-style track with no view, holding a rack whose chain exposes no devices
fn bare_song() -> Arc<MemorySong> {
    let rack = MemoryDevice::rack("Rack").with_chain(MemoryChain::new("Empty").without_devices());
    MemorySong::new()
        .with_track(MemoryTrack::new("Return A").without_view().with_device(rack))
        .into_arc()
}

#[rstest]
#[case("/live/track/view/select_instrument", &[0], &[0, 0])]
#[case("/live/track/view/get/selected_device", &[0], &[0, -1])]
#[case("/live/track/view/get/device_insert_mode", &[0], &[0, 0])]
#[case("/live/track/view/get/is_collapsed", &[0], &[0, 0])]
#[case("/live/track/view/select_device", &[0, 0], &[0, 0])]
#[case("/live/chain/get/num_devices", &[0, 0, 0], &[0, 0, 0, 0])]
fn test_missing_capability_fallbacks(#[case] address: &str, #[case] args: &[i64], #[case] expected: &[i64]) {
    let song = bare_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge.dispatch(&msg(address, ints(args))).expect("expected a reply");
    assert_eq!(reply.args, ints(expected));
}

#[rstest]
#[case("/live/track/view/set/device_insert_mode", &[0, 1])]
#[case("/live/track/view/set/is_collapsed", &[0, 1])]
#[case("/live/chain/device/get/name", &[0, 0, 0, 0])]
fn test_missing_capability_silent(#[case] address: &str, #[case] args: &[i64]) {
    let song = bare_song();
    let (bridge, mut rx) = bridge(&song);

    bridge.handle(&msg(address, ints(args)));
    assert!(rx.drain().is_empty());
}

#[test]
fn test_select_instrument_reports_selection() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge.dispatch(&msg("/live/track/view/select_instrument", ints(&[2]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(2), Value::Bool(false)]);

    bridge.dispatch(&msg("/live/track/view/select_device", ints(&[2, 0])));
    let reply = bridge.dispatch(&msg("/live/track/view/select_instrument", ints(&[2]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(2), Value::Bool(true)]);
}

#[test]
fn test_arrangement_clips_empty_without_lane() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge
        .dispatch(&msg("/live/track/get/arrangement_clips/name", ints(&[1])))
        .unwrap();
    assert_eq!(reply.args, ints(&[1]));

    let reply = bridge
        .dispatch(&msg("/live/track/get/arrangement_clips/end_time", ints(&[0])))
        .unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::Float(16.0)]);
}

/// Every writable direct attribute reads back what was written
#[rstest]
#[case(EntityKind::Track, &[0])]
#[case(EntityKind::Device, &[2, 1])]
#[case(EntityKind::Chain, &[0, 0, 1])]
fn test_set_then_get_round_trip(#[case] kind: EntityKind, #[case] path: &[i64]) {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let writable = descriptors(kind)
        .iter()
        .filter(|d| d.access == Access::ReadWrite && d.storage == Storage::Direct && d.namespace.is_none());

    let mut checked = 0;
    for descriptor in writable {
        let set = Address::new("live", kind, None, Verb::Set, descriptor.name).to_string();
        let get = Address::new("live", kind, None, Verb::Get, descriptor.name).to_string();

        assert!(bridge.dispatch(&msg(&set, with(ints(path), ints(&[1])))).is_none());
        let reply = bridge.dispatch(&msg(&get, ints(path))).expect("expected a reply");
        assert_eq!(reply.args, with(ints(path), ints(&[1])), "round trip for {}", descriptor.name);
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn test_mixer_and_send_round_trip() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    bridge.dispatch(&msg("/live/track/set/panning", vec![Value::Int(0), Value::Float(-0.5)]));
    let reply = bridge.dispatch(&msg("/live/track/get/panning", ints(&[0]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::Float(-0.5)]);

    bridge.dispatch(&msg("/live/track/set/send", vec![Value::Int(0), Value::Int(1), Value::Float(0.3)]));
    let reply = bridge.dispatch(&msg("/live/track/get/send", ints(&[0, 1]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::Int(1), Value::Float(0.3)]);

    // send index past the end
    assert!(bridge.dispatch(&msg("/live/track/get/send", ints(&[0, 5]))).is_none());
}

#[test]
fn test_chain_device_path_prefix() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge
        .dispatch(&msg("/live/chain/device/get/name", ints(&[0, 0, 0, 1])))
        .unwrap();
    assert_eq!(
        reply.args,
        vec![Value::Int(0), Value::Int(0), Value::Int(0), Value::Int(1), Value::from("Reverb")]
    );
}

#[rstest]
#[case("/live/chain/get/name", &[0, 0, 5])]
#[case("/live/chain/device/get/name", &[0, 0, 0, 9])]
#[case("/live/chain/device/get/name", &[0, 0, 1, 0])]
#[case("/live/device/get/name", &[1, 4])]
#[case("/live/track/get/name", &[7])]
fn test_missing_entities_are_silent(#[case] address: &str, #[case] args: &[i64]) {
    let song = fixture_song();
    let (bridge, mut rx) = bridge(&song);

    assert!(bridge.dispatch(&msg(address, ints(args))).is_none());
    bridge.handle(&msg(address, ints(args)));
    assert!(rx.drain().is_empty());
}

#[test]
fn test_out_of_range_set_changes_nothing() {
    let song = fixture_song();
    let (bridge, mut rx) = bridge(&song);

    bridge.handle(&msg("/live/track/set/mute", ints(&[3, 1])));
    assert!(rx.drain().is_empty());
    for index in 0..3 {
        let track = song.track(index).unwrap();
        assert_eq!(track.get("mute").unwrap(), Value::Int(0));
    }
}

#[test]
fn test_wildcard_first_responder() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    // only Keys has a second device
    let reply = bridge
        .dispatch(&msg("/live/device/get/name", vec![Value::from("*"), Value::Int(1)]))
        .unwrap();
    assert_eq!(reply.args, vec![Value::Int(2), Value::Int(1), Value::from("Chorus")]);

    let reply = bridge.dispatch(&msg("/live/track/get/name", vec![Value::from("*")])).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::from("Drums")]);

    assert!(bridge
        .dispatch(&msg("/live/device/get/name", vec![Value::from("*"), Value::Int(5)]))
        .is_none());
}

#[test]
fn test_wildcard_emits_one_message_for_four_tracks() {
    let song = MemorySong::new()
        .with_track(MemoryTrack::new("A").with_device(MemoryDevice::new("Utility")))
        .with_track(MemoryTrack::new("B").with_device(MemoryDevice::new("Utility")))
        .with_track(
            MemoryTrack::new("C")
                .with_device(MemoryDevice::new("Utility"))
                .with_device(MemoryDevice::new("Echo")),
        )
        .with_track(MemoryTrack::new("D").with_device(MemoryDevice::new("Utility")))
        .into_arc();
    let (bridge, mut rx) = bridge(&song);

    bridge.handle(&msg("/live/device/get/name", vec![Value::from("*"), Value::Int(1)]));
    let sent = rx.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].args, vec![Value::Int(2), Value::Int(1), Value::from("Echo")]);
}

#[test]
fn test_wildcard_set_reaches_every_track() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    assert!(bridge
        .dispatch(&msg("/live/track/set/solo", vec![Value::from("*"), Value::Int(1)]))
        .is_none());
    for index in 0..3 {
        assert_eq!(song.track(index).unwrap().get("solo").unwrap(), Value::Int(1));
    }
}

#[test]
fn test_unknown_routing_name_keeps_current() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge
        .dispatch(&msg("/live/track/get/available_output_routing_types", ints(&[0])))
        .unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::from("Master"), Value::from("Sends Only")]);

    assert!(bridge
        .dispatch(&msg("/live/track/set/output_routing_type", vec![Value::Int(0), Value::from("Nowhere")]))
        .is_none());
    let reply = bridge.dispatch(&msg("/live/track/get/output_routing_type", ints(&[0]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::from("Master")]);

    bridge.dispatch(&msg("/live/track/set/output_routing_type", vec![Value::Int(0), Value::from("Sends Only")]));
    let reply = bridge.dispatch(&msg("/live/track/get/output_routing_type", ints(&[0]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::from("Sends Only")]);

    // no routing configured on Bass
    let reply = bridge.dispatch(&msg("/live/track/get/output_routing_type", ints(&[1]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(1), Value::Nil]);
}

#[test]
fn test_view_device_selection() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge
        .dispatch(&msg("/live/track/view/get/selected_device", ints(&[2])))
        .unwrap();
    assert_eq!(reply.args, ints(&[2, -1]));

    let reply = bridge.dispatch(&msg("/live/track/view/select_device", ints(&[2, 1]))).unwrap();
    assert_eq!(reply.args, ints(&[2, 1]));

    let reply = bridge
        .dispatch(&msg("/live/track/view/get/selected_device", ints(&[2])))
        .unwrap();
    assert_eq!(reply.args, ints(&[2, 1]));

    let reply = bridge.dispatch(&msg("/live/track/view/select_device", ints(&[2, 8]))).unwrap();
    assert_eq!(reply.args, ints(&[2, 0]));
}

#[test]
fn test_view_attribute_round_trip() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    bridge.dispatch(&msg("/live/track/view/set/is_collapsed", ints(&[1, 1])));
    let reply = bridge.dispatch(&msg("/live/track/view/get/is_collapsed", ints(&[1]))).unwrap();
    assert_eq!(reply.args, ints(&[1, 1]));

    // integral floats are stored as integers, fractional ones are rejected
    bridge.dispatch(&msg("/live/track/view/set/is_collapsed", vec![Value::Int(1), Value::Float(0.0)]));
    bridge.dispatch(&msg("/live/track/view/set/is_collapsed", vec![Value::Int(1), Value::Float(0.5)]));
    let reply = bridge.dispatch(&msg("/live/track/view/get/is_collapsed", ints(&[1]))).unwrap();
    assert_eq!(reply.args, ints(&[1, 0]));
}

#[test]
fn test_delete_clip_empties_slot() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge.dispatch(&msg("/live/track/get/clips/name", ints(&[0]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::from("Intro"), Value::Nil]);

    assert!(bridge.dispatch(&msg("/live/track/delete_clip", ints(&[0, 0]))).is_none());
    let reply = bridge.dispatch(&msg("/live/track/get/clips/name", ints(&[0]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(0), Value::Nil, Value::Nil]);
}

#[test]
fn test_void_action_reaches_host() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    assert!(bridge.dispatch(&msg("/live/track/stop_all_clips", ints(&[1]))).is_none());
    assert_eq!(song.track(1).unwrap().object().calls(), vec!["stop_all_clips".to_string()]);
    assert!(song.track(0).unwrap().object().calls().is_empty());
}

#[test]
fn test_collection_queries() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    let reply = bridge.dispatch(&msg("/live/track/get/devices/name", ints(&[2]))).unwrap();
    assert_eq!(reply.args, vec![Value::Int(2), Value::from("Wavetable"), Value::from("Chorus")]);

    let reply = bridge.dispatch(&msg("/live/track/get/num_devices", ints(&[0]))).unwrap();
    assert_eq!(reply.args, ints(&[0, 1]));

    let reply = bridge.dispatch(&msg("/live/track/get/num_clip_slots", ints(&[0]))).unwrap();
    assert_eq!(reply.args, ints(&[0, 2]));
}

#[test]
fn test_malformed_arguments_are_ignored() {
    let song = fixture_song();
    let (bridge, _rx) = bridge(&song);

    assert!(bridge.dispatch(&msg("/live/track/get/name", vec![])).is_none());
    assert!(bridge.dispatch(&msg("/live/track/get/name", vec![Value::from("drums")])).is_none());
    assert!(bridge.dispatch(&msg("/live/chain/get/name", ints(&[0, 0]))).is_none());
    assert!(bridge.dispatch(&msg("/live/track/get/name", ints(&[-1]))).is_none());
}
