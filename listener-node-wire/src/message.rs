use crate::{constants::HEADER_LEN, error::HeaderError, header::Header, PktType};
use anyhow::{bail, Result};
use log::trace;

/// a complete frame: header, topic and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// `Header`: the header of the frame.
    pub header: Header,
    /// The topic the frame refers to.
    pub topic: String,
    /// the payload, bytes.
    pub message: Vec<u8>,
}

impl Frame {
    /// Creates a new `Frame`, checking the topic and payload fit the header fields.
    /// ```
    /// use listener_node_wire::message::Frame;
    /// use listener_node_wire::PktType;
    /// let frame = Frame::new(PktType::PUBLISH, "/chatter", b"hello".to_vec()).unwrap();
    /// assert_eq!(frame.header.topic_length, 8);
    /// ```
    pub fn new(pkt_type: PktType, topic: &str, message: Vec<u8>) -> Result<Frame> {
        let topic_length =
            u8::try_from(topic.len()).map_err(|_| HeaderError::InvalidTopicLength)?;
        let message_length = u16::try_from(message.len())
            .map_err(|_| HeaderError::InvalidMessageLength(message.len()))?;
        Ok(Frame {
            header: Header::new(pkt_type, topic_length, message_length),
            topic: topic.to_string(),
            message,
        })
    }

    /// the acknowledgement the broker sends back for this frame.
    /// ```
    /// use listener_node_wire::message::Frame;
    /// use listener_node_wire::PktType;
    /// let frame = Frame::new(PktType::SUBSCRIBE, "/chatter", vec![]).unwrap();
    /// let ack = frame.ack().unwrap();
    /// assert_eq!(ack.header.pkt_type, PktType::SUBSCRIBEACK);
    /// assert_eq!(ack.topic, "/chatter");
    /// ```
    pub fn ack(&self) -> Result<Frame> {
        Ok(Frame {
            header: self.header.ack_header()?,
            topic: self.topic.clone(),
            message: vec![],
        })
    }

    /// returns bytes for the `Frame` that can be written to the stream.
    pub fn bytes(&self) -> Vec<u8> {
        let mut buffer: Vec<u8> = Vec::with_capacity(HEADER_LEN + self.header.body_len());
        buffer.extend_from_slice(&self.header.bytes());
        buffer.extend_from_slice(self.topic.as_bytes());
        buffer.extend_from_slice(&self.message);
        trace!("the generated buffer is: {:?}", buffer);
        buffer
    }

    /// builds a `Frame` from an already parsed header and the bytes that follow it.
    pub fn from_parts(header: Header, body: &[u8]) -> Result<Frame> {
        if body.len() != header.body_len() {
            bail!("invalid frame body length: {} != {}", body.len(), header.body_len());
        }
        let (topic, message) = body.split_at(header.topic_length as usize);
        Ok(Frame {
            header,
            topic: String::from_utf8(topic.to_vec())?,
            message: message.to_vec(),
        })
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = anyhow::Error;

    /// Parses a `Frame` from a byte slice.
    /// ```
    /// use listener_node_wire::message::Frame;
    /// let buf = [15, 0, 1, 2, 3, 0, 12, 0, 97, 98,
    ///   99, 116, 101, 115, 116, 32, 109, 101, 115,
    ///   115, 97, 103, 101];
    /// let frame = Frame::try_from(buf.as_ref()).unwrap();
    /// assert_eq!(frame.topic, "abc");
    /// ```
    fn try_from(bytes: &[u8]) -> Result<Frame> {
        if bytes.len() < HEADER_LEN {
            bail!(HeaderError::InvalidHeaderBufferLength(bytes.len()));
        }
        let header = Header::try_from(&bytes[..HEADER_LEN])?;
        let frame_end = HEADER_LEN + header.body_len();
        if bytes.len() < frame_end {
            bail!("invalid Frame length");
        }
        Frame::from_parts(header, &bytes[HEADER_LEN..frame_end])
    }
}

impl TryFrom<Vec<u8>> for Frame {
    type Error = anyhow::Error;

    fn try_from(bytes: Vec<u8>) -> Result<Frame> {
        Frame::try_from(bytes.as_ref())
    }
}
