use crate::types::{Collection, RoutingSlot};
use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while resolving or operating on the object graph
///
/// None of these reach the transport. The dispatch router turns them into
/// silence or into the fallback value declared by the property descriptor.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Requested index exceeds its parent collection
    #[error("{collection} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Collection that was indexed
        collection: Collection,
        /// Requested index
        index: usize,
        /// Collection length at the time of the request
        len: usize,
    },

    /// Entity does not expose an optional capability
    #[error("Capability missing: {0}")]
    CapabilityMissing(&'static str),

    /// Routing display name matched none of the available options
    #[error("Couldn't find {slot}: {name}")]
    UnknownEnumerationName {
        /// Routing selection that was being set
        slot: RoutingSlot,
        /// Requested display name
        name: String,
    },

    /// Host object has no attribute or action with this name
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// Argument could not be interpreted (wrong type or missing)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Host object graph rejected the operation
    #[error("Host error: {0}")]
    Host(String),

    /// Outbound channel was closed
    #[error("Transport closed")]
    TransportClosed,

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl BridgeError {
    /// Whether this failure degrades to a descriptor's fallback value
    ///
    /// Missing capabilities always do. Out-of-range indices only do inside
    /// optional collections; a bad track or device index stays silent.
    pub fn allows_fallback(&self) -> bool {
        match self {
            BridgeError::CapabilityMissing(_) => true,
            BridgeError::IndexOutOfRange { collection, .. } => collection.is_optional(),
            _ => false,
        }
    }
}
