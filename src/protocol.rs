use crate::types::{EntityKind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address-pattern message carrying typed arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscMessage {
    pub address: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl OscMessage {
    /// Create a message with no arguments
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the argument list
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Operation selected by the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Set,
    StartListen,
    StopListen,
    /// Named action; the address carries the action name with no verb segment
    Invoke,
}

impl Verb {
    pub fn segment(self) -> Option<&'static str> {
        match self {
            Verb::Get => Some("get"),
            Verb::Set => Some("set"),
            Verb::StartListen => Some("start_listen"),
            Verb::StopListen => Some("stop_listen"),
            Verb::Invoke => None,
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "get" => Some(Verb::Get),
            "set" => Some(Verb::Set),
            "start_listen" => Some(Verb::StartListen),
            "stop_listen" => Some(Verb::StopListen),
            _ => None,
        }
    }
}

/// Structured form of `/root/kind[/namespace]/verb/name`
///
/// Names may themselves contain slashes (`clips/name`), so everything after
/// the verb belongs to the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub root: String,
    pub kind: EntityKind,
    pub namespace: Option<String>,
    pub verb: Verb,
    pub name: String,
}

impl Address {
    pub fn new(root: &str, kind: EntityKind, namespace: Option<&str>, verb: Verb, name: &str) -> Self {
        Self {
            root: root.to_string(),
            kind,
            namespace: namespace.map(str::to_string),
            verb,
            name: name.to_string(),
        }
    }

    /// Parse an address string
    ///
    /// Returns `None` when the text is not of the bridge's address shape.
    pub fn parse(address: &str) -> Option<Self> {
        let mut parts = address.strip_prefix('/')?.split('/').peekable();
        let root = parts.next().filter(|r| !r.is_empty())?.to_string();

        let kind = match parts.next()? {
            "track" => EntityKind::Track,
            "device" => EntityKind::Device,
            "chain" => {
                if parts.peek() == Some(&"device") {
                    parts.next();
                    EntityKind::ChainDevice
                } else {
                    EntityKind::Chain
                }
            }
            _ => return None,
        };

        let namespace = if parts.peek() == Some(&"view") {
            parts.next().map(str::to_string)
        } else {
            None
        };

        let rest: Vec<&str> = parts.collect();
        let (verb, name) = match rest.split_first() {
            Some((first, tail)) => match Verb::from_segment(first) {
                Some(verb) if !tail.is_empty() => (verb, tail.join("/")),
                Some(_) => return None,
                None => (Verb::Invoke, rest.join("/")),
            },
            None => return None,
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            root,
            kind,
            namespace,
            verb,
            name,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.root, self.kind.segment())?;
        if let Some(namespace) = &self.namespace {
            write!(f, "/{}", namespace)?;
        }
        if let Some(verb) = self.verb.segment() {
            write!(f, "/{}", verb)?;
        }
        write!(f, "/{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let addr = Address::parse("/live/track/get/volume").unwrap();
        assert_eq!(addr.kind, EntityKind::Track);
        assert_eq!(addr.verb, Verb::Get);
        assert_eq!(addr.name, "volume");
        assert_eq!(addr.namespace, None);
    }

    #[test]
    fn test_parse_nested_kinds_and_names() {
        let addr = Address::parse("/live/chain/device/get/name").unwrap();
        assert_eq!(addr.kind, EntityKind::ChainDevice);

        let addr = Address::parse("/live/track/get/clips/name").unwrap();
        assert_eq!(addr.name, "clips/name");

        let addr = Address::parse("/live/track/view/select_instrument").unwrap();
        assert_eq!(addr.namespace.as_deref(), Some("view"));
        assert_eq!(addr.verb, Verb::Invoke);
        assert_eq!(addr.name, "select_instrument");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Address::parse("live/track/get/name").is_none());
        assert!(Address::parse("/live/song/get/tempo").is_none());
        assert!(Address::parse("/live/track/get").is_none());
        assert!(Address::parse("/live/track").is_none());
    }

    #[test]
    fn test_display_round_trips_parse() {
        for text in [
            "/live/track/start_listen/mute",
            "/live/chain/device/get/name",
            "/live/track/view/set/is_collapsed",
            "/live/track/stop_all_clips",
        ] {
            assert_eq!(Address::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_message_display() {
        let msg = OscMessage::new("/live/track/get/name").with_arg(0).with_arg("Drums");
        assert_eq!(msg.to_string(), "/live/track/get/name 0 \"Drums\"");
    }
}
