//! Typed messages carried on topics.

use crate::error::NodeError;
use log::info;
use std::fmt::Display;

/// a message type that can be decoded from a delivery payload.
pub trait TopicMessage: Sized {
    /// name used in logs and errors, `package/Type` style.
    const TYPE_NAME: &'static str;

    fn decode(topic: &str, payload: &[u8]) -> Result<Self, NodeError>;
}

/// a message with a single text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMsg {
    pub data: String,
}

impl TopicMessage for StringMsg {
    const TYPE_NAME: &'static str = "std_msgs/String";

    fn decode(topic: &str, payload: &[u8]) -> Result<Self, NodeError> {
        match std::str::from_utf8(payload) {
            Ok(data) => Ok(StringMsg {
                data: data.to_string(),
            }),
            Err(e) => Err(NodeError::Decode {
                topic: topic.to_string(),
                type_name: Self::TYPE_NAME,
                reason: e.to_string(),
            }),
        }
    }
}

impl Display for StringMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I heard: [{}]", self.data)
    }
}

/// default callback: one info line per message.
pub fn log_heard(msg: &StringMsg) {
    info!("{}", msg);
}
