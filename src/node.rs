//! The subscriber node: one explicit handle instead of process-wide state.
//!
//! A [`NodeHandle`] only exists once the middleware is up, so the only
//! lifecycle transition (uninitialized to running) is constructing it.

use crate::args::NodeOptions;
use crate::error::NodeError;
use crate::middleware::{Delivery, Middleware};
use crate::msgs::{log_heard, StringMsg, TopicMessage};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::future::Future;

/// topic the listener subscribes to unless told otherwise
pub const DEFAULT_TOPIC: &str = "/vicon/Jet/Jet";

/// messages buffered per subscription unless told otherwise
pub const DEFAULT_QUEUE_DEPTH: usize = 1000;

/// type-erased callback: decodes the payload and hands it to the user callback
type Callback = Box<dyn FnMut(&Delivery) -> Result<(), NodeError> + Send>;

/// what the listener subscribes to.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    pub topic: String,
    pub queue_depth: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            topic: DEFAULT_TOPIC.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// A running node and the subscriptions it owns.
pub struct NodeHandle<M: Middleware> {
    options: NodeOptions,
    middleware: M,
    callbacks: HashMap<String, Vec<Callback>>,
}

impl<M: Middleware> NodeHandle<M> {
    /// wraps an initialized middleware.
    pub fn new(options: NodeOptions, middleware: M) -> NodeHandle<M> {
        NodeHandle {
            options,
            middleware,
            callbacks: HashMap::new(),
        }
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    /// resolved names of the subscribed topics.
    pub fn topics(&self) -> Vec<String> {
        self.callbacks.keys().cloned().collect()
    }

    /// Subscribes `callback` to `topic`.
    ///
    /// The name is resolved against the node's namespace and remappings first.
    /// Payloads that do not decode as `T` are dropped with a warning and never
    /// reach the callback.
    pub async fn subscribe<T, F>(
        &mut self,
        topic: &str,
        queue_depth: usize,
        mut callback: F,
    ) -> Result<(), NodeError>
    where
        T: TopicMessage + 'static,
        F: FnMut(&T) + Send + 'static,
    {
        if queue_depth == 0 {
            return Err(NodeError::InvalidQueueDepth(queue_depth));
        }
        let resolved = self.options.resolve(topic)?;
        if resolved != topic {
            debug!("{} resolved to {}", topic, resolved);
        }

        self.middleware.subscribe(&resolved, queue_depth).await?;
        info!(
            "{} listening on {} [{}]",
            self.options.fully_qualified_name(),
            resolved,
            T::TYPE_NAME
        );

        let erased: Callback = Box::new(move |delivery: &Delivery| {
            let msg = T::decode(&delivery.topic, &delivery.payload)?;
            callback(&msg);
            Ok(())
        });
        self.callbacks.entry(resolved).or_default().push(erased);
        Ok(())
    }

    /// Dispatches deliveries until Ctrl-C.
    pub async fn spin(&mut self) -> Result<(), NodeError> {
        self.spin_until(shutdown_signal()).await
    }

    /// Dispatches deliveries until `signal` completes.
    ///
    /// Callbacks run one at a time on the calling task, in the order the
    /// middleware delivers. Returns `Ok(())` on `signal` or when the middleware
    /// shuts down, and the middleware's error if its transport fails.
    pub async fn spin_until<S>(&mut self, signal: S) -> Result<(), NodeError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(signal);
        loop {
            let next = tokio::select! {
                biased;
                _ = &mut signal => None,
                delivery = self.middleware.next_delivery() => Some(delivery),
            };
            match next {
                None => {
                    info!("shutdown requested");
                    return Ok(());
                }
                Some(Ok(Some(delivery))) => self.dispatch(&delivery),
                Some(Ok(None)) => {
                    info!("middleware shut down");
                    return Ok(());
                }
                Some(Err(e)) => return Err(e),
            }
        }
    }

    fn dispatch(&mut self, delivery: &Delivery) {
        let Some(callbacks) = self.callbacks.get_mut(&delivery.topic) else {
            debug!("no callback for {}", delivery.topic);
            return;
        };
        for callback in callbacks.iter_mut() {
            if let Err(e) = callback(delivery) {
                warn!("dropping message: {}", e);
            }
        }
    }

    /// Unsubscribes every topic and closes the middleware.
    pub async fn shutdown(mut self) -> Result<(), NodeError> {
        for topic in self.callbacks.keys() {
            if let Err(e) = self.middleware.unsubscribe(topic).await {
                warn!("could not unsubscribe from {}: {}", topic, e);
            }
        }
        self.middleware.shutdown().await
    }
}

/// completes on Ctrl-C; never completes if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("unable to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Connect, subscribe the logging callback, spin until `signal`, shut down.
///
/// Nothing is subscribed if `connect` fails.
pub async fn run<M, C, Fut, S>(
    options: NodeOptions,
    config: &ListenerConfig,
    connect: C,
    signal: S,
) -> Result<(), NodeError>
where
    M: Middleware,
    C: FnOnce(NodeOptions) -> Fut,
    Fut: Future<Output = Result<M, NodeError>>,
    S: Future<Output = ()>,
{
    let middleware = connect(options.clone()).await?;
    let mut node = NodeHandle::new(options, middleware);
    node.subscribe::<StringMsg, _>(&config.topic, config.queue_depth, log_heard)
        .await?;

    let spun = node.spin_until(signal).await;
    let closed = node.shutdown().await;
    spun.and(closed)
}
