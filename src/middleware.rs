use crate::error::NodeError;
use std::future::Future;

/// a payload handed over by the middleware for one subscribed topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// The primitives a node needs from the pub/sub runtime.
///
/// Transport, buffering and drop policy live behind this trait; the node only
/// registers topics and pulls deliveries one at a time.
pub trait Middleware {
    /// registers interest in `topic`, buffering at most `queue_depth`
    /// undelivered messages for it.
    fn subscribe(
        &mut self,
        topic: &str,
        queue_depth: usize,
    ) -> impl Future<Output = Result<(), NodeError>> + Send;

    fn unsubscribe(&mut self, topic: &str) -> impl Future<Output = Result<(), NodeError>> + Send;

    /// waits for the next delivery on any subscribed topic.
    /// `Ok(None)` means the middleware was shut down and nothing more will arrive.
    fn next_delivery(&mut self) -> impl Future<Output = Result<Option<Delivery>, NodeError>> + Send;

    fn shutdown(&mut self) -> impl Future<Output = Result<(), NodeError>> + Send;
}
