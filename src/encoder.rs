use crate::protocol::OscMessage;
use crate::types::Value;

/// Result of one dispatch
///
/// `Silent` is the explicit absent variant: nothing is emitted for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Values to emit, already prefixed with the resolved path
    Reply(Vec<Value>),
    Silent,
}

impl Outcome {
    pub fn is_reply(&self) -> bool {
        matches!(self, Outcome::Reply(_))
    }

    /// Turn a reply into an outbound message on `address`
    pub fn into_message(self, address: &str) -> Option<OscMessage> {
        match self {
            Outcome::Reply(args) => Some(OscMessage::new(address).with_args(args)),
            Outcome::Silent => None,
        }
    }
}

/// Prefix a result with every index consumed during resolution
pub fn encode(path: &[usize], result: Option<Vec<Value>>) -> Outcome {
    match result {
        Some(values) => Outcome::Reply(prefixed(path, values)),
        None => Outcome::Silent,
    }
}

fn prefixed(path: &[usize], values: Vec<Value>) -> Vec<Value> {
    let mut args = Vec::with_capacity(path.len() + values.len());
    args.extend(path.iter().map(|&index| Value::from(index)));
    args.extend(values);
    args
}
