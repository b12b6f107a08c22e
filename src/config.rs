use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// First address segment, e.g. `live` in `/live/track/get/name`
    #[serde(default = "default_root")]
    pub root: String,

    /// Token that replaces the track index to address every track
    #[serde(default = "default_wildcard")]
    pub wildcard: String,
}

fn default_root() -> String {
    "live".to_string()
}

fn default_wildcard() -> String {
    "*".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            wildcard: default_wildcard(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON configuration document; missing fields take defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
