use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Scalar argument or result value
///
/// `Nil` is an explicit "nothing here" element inside a result tuple (an
/// empty clip slot, a track with no group). A whole result that is absent is
/// modeled by [`crate::encoder::Outcome::Silent`], never by `Nil`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Nil,
}

impl Value {
    /// Interpret as a non-negative collection index
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Int(i) => usize::try_from(*i).ok(),
            Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
            _ => None,
        }
    }

    /// Interpret as an integer, accepting integral floats and booleans
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Borrow the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Nil => f.write_str("nil"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// Addressable entity kinds, ordered by depth in the object graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Track,
    Device,
    Chain,
    ChainDevice,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Track,
        EntityKind::Device,
        EntityKind::Chain,
        EntityKind::ChainDevice,
    ];

    /// Number of leading index arguments that address this kind
    pub fn arity(self) -> usize {
        match self {
            EntityKind::Track => 1,
            EntityKind::Device => 2,
            EntityKind::Chain => 3,
            EntityKind::ChainDevice => 4,
        }
    }

    /// Address segment(s) naming this kind, e.g. `chain/device`
    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Device => "device",
            EntityKind::Chain => "chain",
            EntityKind::ChainDevice => "chain/device",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Index-addressable collections in the object graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tracks,
    Devices,
    Chains,
    ChainDevices,
    ClipSlots,
    ArrangementClips,
    TakeLanes,
    Sends,
}

impl Collection {
    /// Collections that not every owner exposes
    ///
    /// Failures inside these degrade to a fallback rather than silence.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Collection::Chains
                | Collection::ChainDevices
                | Collection::ArrangementClips
                | Collection::TakeLanes
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Collection::Tracks => "track",
            Collection::Devices => "device",
            Collection::Chains => "chain",
            Collection::ChainDevices => "chain device",
            Collection::ClipSlots => "clip slot",
            Collection::ArrangementClips => "arrangement clip",
            Collection::TakeLanes => "take lane",
            Collection::Sends => "send",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Track routing selections that are set by display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingSlot {
    OutputType,
    OutputChannel,
    InputType,
    InputChannel,
}

impl RoutingSlot {
    pub fn label(self) -> &'static str {
        match self {
            RoutingSlot::OutputType => "output routing type",
            RoutingSlot::OutputChannel => "output routing channel",
            RoutingSlot::InputType => "input routing type",
            RoutingSlot::InputChannel => "input routing channel",
        }
    }
}

impl fmt::Display for RoutingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of an `available_*` routing list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingOption {
    pub display_name: String,

    /// Opaque host handle for this option
    pub handle: u64,
}

impl RoutingOption {
    pub fn new(display_name: impl Into<String>, handle: u64) -> Self {
        Self {
            display_name: display_name.into(),
            handle,
        }
    }
}

/// Handle returned by a parameter when a change listener is registered
///
/// Closures have no identity in Rust, so removal goes through this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversion() {
        assert_eq!(Value::Int(3).as_index(), Some(3));
        assert_eq!(Value::Float(2.0).as_index(), Some(2));
        assert_eq!(Value::Int(-1).as_index(), None);
        assert_eq!(Value::Float(1.5).as_index(), None);
        assert_eq!(Value::from("*").as_index(), None);
    }

    #[test]
    fn test_arity_follows_depth() {
        let arities: Vec<usize> = EntityKind::ALL.iter().map(|k| k.arity()).collect();
        assert_eq!(arities, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_optional_collections() {
        assert!(Collection::Chains.is_optional());
        assert!(Collection::ChainDevices.is_optional());
        assert!(!Collection::Tracks.is_optional());
        assert!(!Collection::Devices.is_optional());
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<&str>), Value::Nil);
        assert_eq!(Value::from(Some("Clip")), Value::Str("Clip".to_string()));
    }
}
