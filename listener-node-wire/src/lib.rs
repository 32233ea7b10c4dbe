pub mod error;
pub mod header;
pub mod message;
pub mod pkt;
pub use pkt::PktType;

pub mod constants {

    /// supported versions of the frame format.
    pub const SUPPORTED_VERSIONS: [[u8; 2]; 1] = [[0x00, 0x01]];

    /// default version of the frame format.
    pub const DEFAULT_VERSION: [u8; 2] = [0x00, 0x01];

    /// the header length
    pub const HEADER_LEN: usize = 8;

    /// longest topic a header can describe
    pub const MAX_TOPIC_LEN: usize = u8::MAX as usize;

    /// Packet Type Register
    pub const REGISTER: u8 = 0x01;
    /// Packet Type Publish
    pub const PUBLISH: u8 = 0x02;
    /// Packet Type Subscribe
    pub const SUBSCRIBE: u8 = 0x03;
    /// Packet Type Unsubscribe
    pub const UNSUBSCRIBE: u8 = 0x04;
    /// Packet Type Register Acknowledgement
    pub const REGISTERACK: u8 = 0x0A;
    /// Packet Type Publish Acknowledgement
    pub const PUBLISHACK: u8 = 0x0B;
    /// Packet Type Subscribe Acknowledgement
    pub const SUBSCRIBEACK: u8 = 0x0C;
    /// Packet Type Unsubscribe Acknowledgement
    pub const UNSUBSCRIBEACK: u8 = 0x0D;
}

#[cfg(test)]
mod tests {
    use crate::error::HeaderError;
    use crate::header::Header;
    use crate::message::Frame;
    use crate::PktType;
    use log::info;

    #[test]
    fn header_parse_pass() {
        // Header { header: 15, version: [0, 1], pkt_type: PUBLISH, topic_length: 3, message_length: 12, padding: 0 }
        let header = Header::try_from(vec![
            15, // `HEADER_BYTE`
            0, 1, // `VERSION_BYTE_0`, `VERSION_BYTE_1`
            2, // `PktType`
            3, // `TOPIC_LENGTH_BYTE`
            0, 12, // `MESSAGE_LENGTH_BYTE_0`, `MESSAGE_LENGTH_BYTE_1`
            0,  // `PADDING_BYTE`
        ])
        .unwrap();
        assert_eq!(header.pkt_type, PktType::PUBLISH);
        assert_eq!(header.body_len(), 15);
    }

    #[test]
    fn header_parse_fail() {
        // wrong start byte
        assert!(Header::try_from(vec![16, 0, 1, 2, 3, 0, 12, 0]).is_err());
        // unsupported version
        assert!(Header::try_from(vec![15, 0, 2, 2, 3, 0, 12, 0]).is_err());
        // short buffer
        assert!(Header::try_from(vec![15, 0, 1, 2]).is_err());
    }

    #[test]
    fn header_rejects_unknown_packet_type() {
        let err = Header::try_from(vec![15, 0, 1, 0x05, 3, 0, 12, 0]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HeaderError>(),
            Some(&HeaderError::InvalidPacketType(0x05))
        );
    }

    #[test]
    fn publish_needs_topic_and_payload() {
        assert!(Header::try_from(vec![15, 0, 1, 2, 0, 0, 12, 0]).is_err());
        assert!(Header::try_from(vec![15, 0, 1, 2, 3, 0, 0, 0]).is_err());
        // an ack without payload is fine
        assert!(Header::try_from(vec![15, 0, 1, 0x0C, 3, 0, 0, 0]).is_ok());
    }

    #[test]
    fn message_parse_pass() {
        let buf = [
            15, 0, 1, 2, 3, 0, 12, 0, 97, 98, 99, 116, 101, 115, 116, 32, 109, 101, 115, 115, 97,
            103, 101,
        ];
        let frame = Frame::try_from(buf.as_ref()).unwrap();
        info!("{:?}", frame);
        assert_eq!(frame.topic, "abc");
        assert_eq!(frame.message, b"test message");
    }

    #[test]
    fn message_parse_fail() {
        let _ = env_logger::builder().is_test(true).try_init();
        let buf = [
            15, 0, 1, 2, 3, 0, 12, 0, 97, 98, 99, 116, 101, 115, 116, 32, 109, 101, 115, 115, 97,
            103,
        ];
        assert!(Frame::try_from(buf.as_ref()).is_err());
    }

    #[test]
    fn frame_bytes_parse_back() {
        let frame = Frame::new(PktType::PUBLISH, "/vicon/Jet/Jet", b"x: 1.0".to_vec()).unwrap();
        let parsed = Frame::try_from(frame.bytes()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn frame_rejects_oversized_topic() {
        let topic = "/".repeat(256);
        assert!(Frame::new(PktType::SUBSCRIBE, &topic, vec![]).is_err());
    }
}
