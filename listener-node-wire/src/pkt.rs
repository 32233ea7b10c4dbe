use crate::constants::*;
use crate::error::HeaderError;
use std::fmt::Display;

/// Packet type
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktType {
    /// announce the node to the broker
    REGISTER = REGISTER,
    /// a message published on a topic
    PUBLISH = PUBLISH,
    /// subscribe
    SUBSCRIBE = SUBSCRIBE,
    /// unsubscribe
    UNSUBSCRIBE = UNSUBSCRIBE,
    /// acknowledgement to register
    REGISTERACK = REGISTERACK,
    /// acknowledgement to publish
    PUBLISHACK = PUBLISHACK,
    /// acknowledgement to subscribe
    SUBSCRIBEACK = SUBSCRIBEACK,
    /// acknowledgement to unsubscribe
    UNSUBSCRIBEACK = UNSUBSCRIBEACK,
}

impl PktType {
    /// returns the byte for the given type of packet
    /// ```
    /// use listener_node_wire::pkt::PktType;
    /// let subscribe_byte = PktType::SUBSCRIBE.byte();
    /// assert_eq!(subscribe_byte, listener_node_wire::constants::SUBSCRIBE);
    /// ```
    pub fn byte(&self) -> u8 {
        *self as u8
    }

    /// returns the acknowledgement type the broker answers this request with.
    /// ```
    /// use listener_node_wire::PktType;
    /// assert_eq!(PktType::SUBSCRIBE.ack().unwrap(), PktType::SUBSCRIBEACK);
    /// assert!(PktType::SUBSCRIBEACK.ack().is_err());
    /// ```
    pub fn ack(&self) -> Result<PktType, HeaderError> {
        match self {
            PktType::REGISTER => Ok(PktType::REGISTERACK),
            PktType::PUBLISH => Ok(PktType::PUBLISHACK),
            PktType::SUBSCRIBE => Ok(PktType::SUBSCRIBEACK),
            PktType::UNSUBSCRIBE => Ok(PktType::UNSUBSCRIBEACK),
            other => Err(HeaderError::NoAckType(*other)),
        }
    }

    /// true for the packet types a client sends as a request.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            PktType::REGISTER | PktType::PUBLISH | PktType::SUBSCRIBE | PktType::UNSUBSCRIBE
        )
    }
}

impl TryFrom<u8> for PktType {
    type Error = HeaderError;

    fn try_from(byte: u8) -> Result<PktType, HeaderError> {
        let pkt_type = match byte {
            REGISTER => PktType::REGISTER,
            PUBLISH => PktType::PUBLISH,
            SUBSCRIBE => PktType::SUBSCRIBE,
            UNSUBSCRIBE => PktType::UNSUBSCRIBE,
            REGISTERACK => PktType::REGISTERACK,
            PUBLISHACK => PktType::PUBLISHACK,
            SUBSCRIBEACK => PktType::SUBSCRIBEACK,
            UNSUBSCRIBEACK => PktType::UNSUBSCRIBEACK,
            other => return Err(HeaderError::InvalidPacketType(other)),
        };
        Ok(pkt_type)
    }
}

impl Display for PktType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pkt = match self {
            PktType::REGISTER => "REGISTER",
            PktType::PUBLISH => "PUBLISH",
            PktType::SUBSCRIBE => "SUBSCRIBE",
            PktType::UNSUBSCRIBE => "UNSUBSCRIBE",
            PktType::REGISTERACK => "REGISTER_ACK",
            PktType::PUBLISHACK => "PUBLISH_ACK",
            PktType::SUBSCRIBEACK => "SUBSCRIBE_ACK",
            PktType::UNSUBSCRIBEACK => "UNSUBSCRIBE_ACK",
        };
        write!(f, "{}", pkt)
    }
}
