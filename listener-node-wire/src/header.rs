/// Header of a listener-node frame
use crate::{
    constants::{self, *},
    error::HeaderError,
    PktType,
};
use anyhow::{anyhow, bail, Result};

/// byte at index 0
/// indicate the start of header
const HEADER_START: usize = 0;

/// byte at index 7
/// indicate the end of header
const HEADER_END: usize = 7;

/// version is indicated using two bytes,
/// first byte of the version
/// byte at index 1
const VERSION_BYTE_0: usize = 1;

/// second byte of the version
/// byte at index 2
const VERSION_BYTE_1: usize = 2;

/// byte that indicates the packet type
/// byte at index 3
const PACKET_BYTE: usize = 3;

/// byte that indicates the topic length
/// byte at index 4
const TOPIC_LENGTH_BYTE: usize = 4;

/// first byte of the message length (big endian)
/// byte at index 5
const MESSAGE_LENGTH_BYTE_0: usize = 5;

/// second byte of the message length (big endian)
/// byte at index 6
const MESSAGE_LENGTH_BYTE_1: usize = 6;

/// start of the header
/// value: 0x0F
const HEADER_BYTE: u8 = 0x0F;

/// end of header
/// value: 0x00
const PADDING_BYTE: u8 = 0x00;

/// Header of a frame, 8 bytes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// start byte of the packet, default value: 0x0F
    pub header: u8,
    /// protocol version: two bytes.
    pub version: [u8; 2],
    /// packet type: `PktType`
    pub pkt_type: PktType,
    /// length of the topic that follows the header.
    pub topic_length: u8,
    /// length of the payload that follows the topic.
    pub message_length: u16,
    /// padding/end of the header: 0x00
    pub padding: u8,
}

impl Header {
    /// creates a new `Header` with the given data.
    /// ```
    /// use listener_node_wire::header::Header;
    /// use listener_node_wire::PktType;
    /// Header::new(PktType::SUBSCRIBE, 14, 0);
    /// ```
    pub fn new(pkt_type: PktType, topic_len: u8, message_len: u16) -> Header {
        Header {
            header: HEADER_BYTE,
            version: DEFAULT_VERSION,
            pkt_type,
            topic_length: topic_len,
            message_length: message_len,
            padding: PADDING_BYTE,
        }
    }

    /// returns the `Header` the broker answers this request with.
    /// the acknowledgement carries the topic but no payload.
    /// ```
    /// use listener_node_wire::header::Header;
    /// use listener_node_wire::PktType;
    /// let header = Header::new(PktType::SUBSCRIBE, 8, 0);
    /// let ack = header.ack_header().unwrap();
    /// assert_eq!(ack.pkt_type, PktType::SUBSCRIBEACK);
    /// ```
    pub fn ack_header(&self) -> Result<Header> {
        let ack_type = self.pkt_type.ack().map_err(|e| anyhow!(e))?;
        Ok(Header {
            header: HEADER_BYTE,
            version: self.version,
            pkt_type: ack_type,
            topic_length: self.topic_length,
            message_length: 0,
            padding: PADDING_BYTE,
        })
    }

    /// total number of bytes that follow the header.
    pub fn body_len(&self) -> usize {
        self.topic_length as usize + self.message_length as usize
    }

    /// returns the bytes for `Header`.
    pub fn bytes(&self) -> [u8; 8] {
        let message_length_bytes = self.message_length.to_be_bytes();
        [
            self.header,
            self.version[0],
            self.version[1],
            self.pkt_type.byte(),
            self.topic_length,
            message_length_bytes[0],
            message_length_bytes[1],
            self.padding,
        ]
    }
}

impl TryFrom<&[u8]> for Header {
    type Error = anyhow::Error;

    /// Parses a `Header` from a `&[u8]`
    /// ```
    /// use listener_node_wire::header::Header;
    /// Header::try_from([
    ///        15,    // HEADER_BYTE`
    ///        0, 1,  // `VERSION_BYTE_0`, `VERSION_BYTE_1`
    ///        2,     // `PktType`
    ///        3,     // `TOPIC_LENGTH_BYTE`
    ///        0, 12, // `MESSAGE_LENGTH_BYTE_0`, `MESSAGE_LENGTH_BYTE_1`
    ///        0,     // `PADDING_BYTE`
    /// ].as_ref()).unwrap();
    /// ```
    fn try_from(bytes: &[u8]) -> Result<Header> {
        if bytes.len() != constants::HEADER_LEN {
            bail!(HeaderError::InvalidHeaderBufferLength(bytes.len()));
        }

        if !(bytes[HEADER_START] == HEADER_BYTE && bytes[HEADER_END] == PADDING_BYTE) {
            bail!(HeaderError::InvalidHeadOrTail);
        }

        if !SUPPORTED_VERSIONS.contains(&[bytes[VERSION_BYTE_0], bytes[VERSION_BYTE_1]]) {
            bail!(HeaderError::UnsupportedVersion);
        }

        let pkt_type = PktType::try_from(bytes[PACKET_BYTE])?;

        // acks may come without a topic, requests and deliveries may not
        if bytes[TOPIC_LENGTH_BYTE] == 0 && pkt_type.is_request() {
            bail!(HeaderError::InvalidTopicLength);
        }

        let message_length =
            u16::from_be_bytes([bytes[MESSAGE_LENGTH_BYTE_0], bytes[MESSAGE_LENGTH_BYTE_1]]);

        if message_length == 0 && pkt_type == PktType::PUBLISH {
            bail!(HeaderError::InvalidMessageLength(0));
        }

        Ok(Header {
            header: HEADER_BYTE,
            version: [bytes[VERSION_BYTE_0], bytes[VERSION_BYTE_1]],
            pkt_type,
            topic_length: bytes[TOPIC_LENGTH_BYTE],
            message_length,
            padding: PADDING_BYTE,
        })
    }
}

impl TryFrom<Vec<u8>> for Header {
    type Error = anyhow::Error;

    fn try_from(bytes: Vec<u8>) -> Result<Header> {
        Header::try_from(&bytes[..])
    }
}
