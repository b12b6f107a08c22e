//! Property Access Gateway
//!
//! Uniform get / set / invoke against a resolved entity. The descriptor's
//! storage kind decides where the value lives; call sites never special-case
//! mixer parameters, routing or the track view.

use crate::descriptor::{PropertyDescriptor, Query, Storage};
use crate::error::{BridgeError, Result};
use crate::host::{same_object, LiveObject, Parameter, Song, Track, TrackView};
use crate::resolver::{Entity, Resolved};
use crate::types::{Collection, RoutingSlot, Value};
use std::sync::Arc;

/// Read the value(s) behind a descriptor
pub fn get(song: &dyn Song, target: &Resolved, descriptor: &PropertyDescriptor) -> Result<Vec<Value>> {
    let entity = &target.entity;
    let name = descriptor.name;

    match descriptor.storage {
        Storage::Direct => Ok(vec![entity.get(name)?]),
        Storage::Mixer => Ok(vec![mixer_parameter(entity.track()?, name)?.value()]),
        Storage::Send => {
            let send_index = index_at(&target.residual, 0)?;
            let send = send_parameter(entity.track()?, send_index)?;
            Ok(vec![Value::from(send_index), send.value()])
        }
        Storage::Routing(slot) => {
            let current = entity.track()?.routing(slot).map(|option| option.display_name);
            Ok(vec![Value::from(current)])
        }
        Storage::View => {
            let view = track_view(entity.track()?)?;
            Ok(vec![view.get(name).map_err(view_attribute)?])
        }
        Storage::Query(query) => run_query(song, entity, query),
        Storage::ClipSlot | Storage::SongView => Err(BridgeError::UnknownProperty(name.to_string())),
    }
}

/// Write the first residual argument through a descriptor
pub fn set(target: &Resolved, descriptor: &PropertyDescriptor) -> Result<()> {
    let entity = &target.entity;
    let name = descriptor.name;

    match descriptor.storage {
        Storage::Direct => {
            let value = arg(&target.residual, 0)?.clone();
            tracing::info!("Setting property {}: {} (new value {})", path_label(&target.path), name, value);
            entity.set(name, value)
        }
        Storage::Mixer => {
            let value = arg(&target.residual, 0)?.clone();
            tracing::info!("Setting mixer property {}: {} (new value {})", path_label(&target.path), name, value);
            mixer_parameter(entity.track()?, name)?.set_value(value)
        }
        Storage::Send => {
            let send_index = index_at(&target.residual, 0)?;
            let value = arg(&target.residual, 1)?.clone();
            send_parameter(entity.track()?, send_index)?.set_value(value)
        }
        Storage::Routing(slot) => set_routing(entity.track()?, slot, arg(&target.residual, 0)?),
        Storage::View => {
            // view attributes are integer-valued
            let requested = arg(&target.residual, 0)?;
            let value = requested
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| BridgeError::InvalidArgument(format!("expected integer, got {}", requested)))?;
            let view = track_view(entity.track()?)?;
            view.set(name, value.clone()).map_err(view_attribute)?;
            tracing::info!("Set view {} to {} for track {}", name, value, path_label(&target.path));
            Ok(())
        }
        Storage::Query(_) | Storage::ClipSlot | Storage::SongView => {
            Err(BridgeError::UnknownProperty(name.to_string()))
        }
    }
}

/// Invoke the action behind a descriptor with the residual arguments
pub fn invoke(song: &dyn Song, target: &Resolved, descriptor: &PropertyDescriptor) -> Result<Option<Vec<Value>>> {
    let entity = &target.entity;
    let name = descriptor.name;
    let args = target.residual.as_slice();

    match descriptor.storage {
        Storage::Direct => entity.call(name, args),
        Storage::View => {
            let view = track_view(entity.track()?)?;
            let result = view.call(name, args).map_err(view_attribute)?;
            tracing::info!("Called view {}, result: {:?}", name, result);
            Ok(result)
        }
        Storage::ClipSlot => {
            let slot_index = index_at(args, 0)?;
            let slots = entity.track()?.clip_slots();
            let slot = slots.get(slot_index).ok_or(BridgeError::IndexOutOfRange {
                collection: Collection::ClipSlots,
                index: slot_index,
                len: slots.len(),
            })?;
            slot.call(name, args.get(1..).unwrap_or_default())
        }
        Storage::SongView => select_device(song, entity.track()?, args).map(Some),
        _ => Err(BridgeError::UnknownProperty(name.to_string())),
    }
}

/// Parameter accessor that a listener subscribes to
pub fn accessor(entity: &Entity, descriptor: &PropertyDescriptor) -> Result<Arc<dyn Parameter>> {
    match descriptor.storage {
        Storage::Direct => entity
            .observe(descriptor.name)
            .ok_or_else(|| BridgeError::UnknownProperty(descriptor.name.to_string())),
        Storage::Mixer => mixer_parameter(entity.track()?, descriptor.name),
        _ => Err(BridgeError::UnknownProperty(descriptor.name.to_string())),
    }
}

fn run_query(song: &dyn Song, entity: &Entity, query: Query) -> Result<Vec<Value>> {
    match query {
        Query::Count(collection) => Ok(vec![Value::from(count(entity, collection)?)]),
        Query::Each(collection, attribute) => each(entity, collection, attribute),
        Query::AvailableRoutings(slot) => Ok(entity
            .track()?
            .available_routings(slot)
            .into_iter()
            .map(|option| Value::Str(option.display_name))
            .collect()),
        Query::GroupTrackName => {
            let name = entity.track()?.group_track().map(|group| group.get("name")).transpose()?;
            Ok(vec![Value::from(name)])
        }
        Query::GroupTrackIndex => {
            let index = entity.track()?.group_track().and_then(|group| {
                song.tracks()
                    .iter()
                    .position(|candidate| same_object(candidate, &group))
            });
            Ok(vec![position_or_none(index)])
        }
        Query::SelectedDevice => {
            let track = entity.track()?;
            let view = track_view(track)?;
            let index = view.selected_device().and_then(|selected| {
                track
                    .devices()
                    .iter()
                    .position(|device| same_object(device, &selected))
            });
            Ok(vec![position_or_none(index)])
        }
    }
}

fn count(entity: &Entity, collection: Collection) -> Result<usize> {
    match (collection, entity) {
        (Collection::Devices, Entity::Track(track)) => Ok(track.devices().len()),
        (Collection::ClipSlots, Entity::Track(track)) => Ok(track.clip_slots().len()),
        (Collection::ArrangementClips, Entity::Track(track)) => Ok(arrangement_clips(track)?.len()),
        (Collection::TakeLanes, Entity::Track(track)) => track
            .take_lane_count()
            .ok_or(BridgeError::CapabilityMissing("take lanes")),
        (Collection::Chains, Entity::Device(device)) => device
            .chains()
            .map(|chains| chains.len())
            .ok_or(BridgeError::CapabilityMissing("chains")),
        (Collection::ChainDevices, Entity::Chain(chain)) => chain
            .devices()
            .map(|devices| devices.len())
            .ok_or(BridgeError::CapabilityMissing("chain devices")),
        _ => Err(BridgeError::CapabilityMissing(collection.name())),
    }
}

fn each(entity: &Entity, collection: Collection, attribute: &str) -> Result<Vec<Value>> {
    match (collection, entity) {
        (Collection::Devices, Entity::Track(track)) => {
            track.devices().iter().map(|device| device.get(attribute)).collect()
        }
        (Collection::ClipSlots, Entity::Track(track)) => track
            .clip_slots()
            .iter()
            .map(|slot| -> Result<Value> {
                let value = slot.clip().map(|clip| clip.get(attribute)).transpose()?;
                Ok(Value::from(value))
            })
            .collect(),
        (Collection::ArrangementClips, Entity::Track(track)) => arrangement_clips(track)?
            .iter()
            .map(|clip| clip.get(attribute))
            .collect(),
        _ => Err(BridgeError::CapabilityMissing(collection.name())),
    }
}

fn arrangement_clips(track: &Arc<dyn Track>) -> Result<Vec<Arc<dyn LiveObject>>> {
    // group and return tracks refuse arrangement access
    track.arrangement_clips().map_err(|e| {
        tracing::debug!("Arrangement clips unavailable: {}", e);
        BridgeError::CapabilityMissing("arrangement clips")
    })
}

fn set_routing(track: &Arc<dyn Track>, slot: RoutingSlot, requested: &Value) -> Result<()> {
    let name = match requested {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    };

    let option = track
        .available_routings(slot)
        .into_iter()
        .find(|option| option.display_name == name)
        .ok_or(BridgeError::UnknownEnumerationName { slot, name })?;

    track.set_routing(slot, &option)
}

fn select_device(song: &dyn Song, track: &Arc<dyn Track>, args: &[Value]) -> Result<Vec<Value>> {
    let Some(device_index) = args.first() else {
        tracing::warn!("No device index provided");
        return Ok(vec![Value::Int(0)]);
    };
    let device_index = device_index
        .as_index()
        .ok_or_else(|| BridgeError::InvalidArgument(format!("expected device index, got {}", device_index)))?;

    let Some(device) = track.devices().get(device_index).cloned() else {
        tracing::warn!("Device index {} out of range", device_index);
        return Ok(vec![Value::Int(0)]);
    };

    if song.select_device(&device) {
        tracing::info!("Selected device at index {}", device_index);
        Ok(vec![Value::Int(1)])
    } else {
        tracing::warn!("Song view cannot select devices");
        Ok(vec![Value::Int(0)])
    }
}

fn mixer_parameter(track: &Arc<dyn Track>, name: &str) -> Result<Arc<dyn Parameter>> {
    track
        .mixer_device()
        .parameter(name)
        .ok_or_else(|| BridgeError::UnknownProperty(name.to_string()))
}

fn send_parameter(track: &Arc<dyn Track>, index: usize) -> Result<Arc<dyn Parameter>> {
    let sends = track.mixer_device().sends();
    sends.get(index).cloned().ok_or(BridgeError::IndexOutOfRange {
        collection: Collection::Sends,
        index,
        len: sends.len(),
    })
}

fn track_view(track: &Arc<dyn Track>) -> Result<Arc<dyn TrackView>> {
    track.view().ok_or(BridgeError::CapabilityMissing("track view"))
}

// A view without the attribute is treated like a missing view.
fn view_attribute(err: BridgeError) -> BridgeError {
    match err {
        BridgeError::UnknownProperty(_) => BridgeError::CapabilityMissing("track view attribute"),
        other => other,
    }
}

fn arg(args: &[Value], position: usize) -> Result<&Value> {
    args.get(position)
        .ok_or_else(|| BridgeError::InvalidArgument(format!("missing argument {}", position)))
}

fn index_at(args: &[Value], position: usize) -> Result<usize> {
    let value = arg(args, position)?;
    value
        .as_index()
        .ok_or_else(|| BridgeError::InvalidArgument(format!("expected index, got {}", value)))
}

fn position_or_none(index: Option<usize>) -> Value {
    index.map_or(Value::Int(-1), Value::from)
}

fn path_label(path: &[usize]) -> String {
    format!("{:?}", path)
}
