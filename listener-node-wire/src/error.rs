use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HeaderError {
    /// invalid header buffer length
    #[error("Invalid header buffer length: `{0}`")]
    InvalidHeaderBufferLength(usize),
    /// invalid header value or padding
    #[error("Invalid header value or padding")]
    InvalidHeadOrTail,
    /// unsupported version of the packet
    #[error("Unsupported version of the packet")]
    UnsupportedVersion,
    /// invalid packet type
    #[error("Invalid packet type: `{0:#04x}`")]
    InvalidPacketType(u8),
    /// invalid topic length
    #[error("Invalid topic length")]
    InvalidTopicLength,
    /// invalid message length
    #[error("Invalid message length: `{0}`")]
    InvalidMessageLength(usize),
    /// the packet type has no acknowledgement
    #[error("No acknowledgement for packet type `{0}`")]
    NoAckType(crate::PktType),
}
