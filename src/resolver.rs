//! Entity Resolver
//!
//! Consumes the leading index arguments of a message and walks them down the
//! object graph: track, device, chain, chain device. A wildcard in the first
//! position expands to one candidate per track, in index order.

use crate::error::{BridgeError, Result};
use crate::host::{Chain, Device, Parameter, Song, Track};
use crate::types::{Collection, EntityKind, Value};
use std::sync::Arc;

/// Entity reached by a resolved path
///
/// Chain devices resolve to [`Entity::Device`]; they differ from track devices
/// only in how they are addressed.
#[derive(Clone)]
pub enum Entity {
    Track(Arc<dyn Track>),
    Device(Arc<dyn Device>),
    Chain(Arc<dyn Chain>),
}

impl Entity {
    pub fn get(&self, name: &str) -> Result<Value> {
        match self {
            Entity::Track(t) => t.get(name),
            Entity::Device(d) => d.get(name),
            Entity::Chain(c) => c.get(name),
        }
    }

    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        match self {
            Entity::Track(t) => t.set(name, value),
            Entity::Device(d) => d.set(name, value),
            Entity::Chain(c) => c.set(name, value),
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Vec<Value>>> {
        match self {
            Entity::Track(t) => t.call(name, args),
            Entity::Device(d) => d.call(name, args),
            Entity::Chain(c) => c.call(name, args),
        }
    }

    pub fn observe(&self, name: &str) -> Option<Arc<dyn Parameter>> {
        match self {
            Entity::Track(t) => t.observe(name),
            Entity::Device(d) => d.observe(name),
            Entity::Chain(c) => c.observe(name),
        }
    }

    /// The entity as a track, for track-only storage kinds
    pub fn track(&self) -> Result<&Arc<dyn Track>> {
        match self {
            Entity::Track(t) => Ok(t),
            _ => Err(BridgeError::CapabilityMissing("track")),
        }
    }
}

/// Successfully resolved target
#[derive(Clone)]
pub struct Resolved {
    /// Concrete indices consumed, in path order
    pub path: Vec<usize>,
    pub entity: Entity,
    /// Arguments left after the index prefix
    pub residual: Vec<Value>,
}

/// Target whose path did not resolve
#[derive(Debug)]
pub struct Unresolved {
    pub path: Vec<usize>,
    pub error: BridgeError,
}

pub type Candidate = std::result::Result<Resolved, Unresolved>;

/// Resolve the leading `kind.arity()` arguments of `args`
///
/// Errors only for malformed arguments. Per-target failures (index out of
/// range, missing chains) come back as [`Unresolved`] candidates so the caller
/// can decide between silence and a fallback reply.
pub fn resolve(song: &dyn Song, kind: EntityKind, args: &[Value], wildcard: &str) -> Result<Vec<Candidate>> {
    let arity = kind.arity();
    if args.len() < arity {
        return Err(BridgeError::InvalidArgument(format!(
            "{} expects {} index arguments, got {}",
            kind,
            arity,
            args.len()
        )));
    }
    let (head, residual) = args.split_at(arity);
    let (first, deeper) = head
        .split_first()
        .ok_or_else(|| BridgeError::InvalidArgument("missing track index".to_string()))?;

    let deeper = deeper
        .iter()
        .map(index_arg)
        .collect::<Result<Vec<usize>>>()?;

    let tracks = song.tracks();
    let track_indices: Vec<usize> = if first.as_str() == Some(wildcard) {
        (0..tracks.len()).collect()
    } else {
        vec![index_arg(first)?]
    };

    let candidates = track_indices
        .into_iter()
        .map(|track_index| {
            let mut path = Vec::with_capacity(arity);
            path.push(track_index);
            path.extend_from_slice(&deeper);

            match descend(&tracks, kind, &path) {
                Ok(entity) => Ok(Resolved {
                    path,
                    entity,
                    residual: residual.to_vec(),
                }),
                Err(error) => Err(Unresolved { path, error }),
            }
        })
        .collect();

    Ok(candidates)
}

fn index_arg(value: &Value) -> Result<usize> {
    value
        .as_index()
        .ok_or_else(|| BridgeError::InvalidArgument(format!("expected index, got {}", value)))
}

fn pick<T: ?Sized>(items: &[Arc<T>], index: usize, collection: Collection) -> Result<Arc<T>> {
    items.get(index).cloned().ok_or(BridgeError::IndexOutOfRange {
        collection,
        index,
        len: items.len(),
    })
}

fn descend(tracks: &[Arc<dyn Track>], kind: EntityKind, path: &[usize]) -> Result<Entity> {
    let mut indices = path.iter().copied();
    let mut next = || {
        indices
            .next()
            .ok_or_else(|| BridgeError::InvalidArgument("path shorter than arity".to_string()))
    };

    let track = pick(tracks, next()?, Collection::Tracks)?;
    if kind == EntityKind::Track {
        return Ok(Entity::Track(track));
    }

    let device = pick(&track.devices(), next()?, Collection::Devices)?;
    if kind == EntityKind::Device {
        return Ok(Entity::Device(device));
    }

    let chains = device
        .chains()
        .ok_or(BridgeError::CapabilityMissing("chains"))?;
    let chain = pick(&chains, next()?, Collection::Chains)?;
    if kind == EntityKind::Chain {
        return Ok(Entity::Chain(chain));
    }

    let chain_devices = chain
        .devices()
        .ok_or(BridgeError::CapabilityMissing("chain devices"))?;
    pick(&chain_devices, next()?, Collection::ChainDevices).map(Entity::Device)
}
