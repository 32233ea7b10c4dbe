use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    /// the node could not reach or register with the master
    #[error("Unable to initialize node `{node}`: {reason}")]
    Init { node: String, reason: String },
    /// the master URI could not be understood
    #[error("Invalid master URI `{0}`")]
    InvalidMasterUri(String),
    /// the graph name is empty or has characters that are not allowed
    #[error("Invalid graph name `{0}`")]
    InvalidName(String),
    /// a queue needs room for at least one message
    #[error("Invalid queue depth: `{0}`, must be at least 1")]
    InvalidQueueDepth(usize),
    /// a `key:=value` argument the node does not understand
    #[error("Invalid node argument `{0}`")]
    InvalidArgument(String),
    /// the payload could not be turned into the subscribed message type
    #[error("Unable to decode `{type_name}` on `{topic}`: {reason}")]
    Decode {
        topic: String,
        type_name: &'static str,
        reason: String,
    },
    /// the broker did not answer in time
    #[error("Timed out waiting for `{0}`")]
    Timeout(String),
    /// the broker answered with something other than the expected acknowledgement
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
    /// the connection to the broker is gone
    #[error("Connection to the master closed")]
    ConnectionClosed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tls(#[from] native_tls::Error),
    #[error(transparent)]
    Wire(#[from] anyhow::Error),
}
