mod inbox;

use crate::args::NodeOptions;
use crate::error::NodeError;
use crate::middleware::{Delivery, Middleware};
use crate::stream;
use inbox::{Inbox, PushOutcome};
use listener_node_wire::message::Frame;
use listener_node_wire::PktType;
use log::{debug, error, info, trace, warn};
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, UnixStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_native_tls::native_tls::{Certificate, TlsConnector};
use tokio_native_tls::TlsStream;

/// how long connecting and each request/acknowledgement exchange may take
pub const TIMEOUT: Duration = Duration::from_secs(4);

/// Where the master listens, parsed from a master URI.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// `tcp://host:port`
    Tcp { host: String, port: u16 },
    /// `tls://host:port`
    Tls { host: String, port: u16 },
    /// `unix:///path/to/socket`
    Unix { path: String },
}

impl Endpoint {
    /// ```
    /// use listener_node::client::Endpoint;
    /// assert_eq!(
    ///     Endpoint::parse("tcp://localhost:6480").unwrap(),
    ///     Endpoint::Tcp { host: "localhost".to_string(), port: 6480 }
    /// );
    /// assert!(Endpoint::parse("http://localhost").is_err());
    /// ```
    pub fn parse(uri: &str) -> Result<Endpoint, NodeError> {
        let invalid = || NodeError::InvalidMasterUri(uri.to_string());
        let (scheme, rest) = uri.split_once("://").ok_or_else(invalid)?;
        match scheme {
            "tcp" | "tls" => {
                let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
                let port: u16 = port.parse().map_err(|_| invalid())?;
                if host.is_empty() {
                    return Err(invalid());
                }
                let host = host.to_string();
                if scheme == "tcp" {
                    Ok(Endpoint::Tcp { host, port })
                } else {
                    Ok(Endpoint::Tls { host, port })
                }
            }
            "unix" if !rest.is_empty() => Ok(Endpoint::Unix {
                path: rest.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

/// Stream for Tcp, Tls and Unix connections
#[derive(Debug)]
enum StreamType {
    Tcp(TcpStream),
    Tls(TlsStream<TcpStream>),
    Unix(UnixStream),
}

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

impl StreamType {
    fn split(self) -> (BoxedReader, BoxedWriter) {
        match self {
            StreamType::Tcp(stream) => {
                let (r, w) = tokio::io::split(stream);
                (Box::new(r), Box::new(w))
            }
            StreamType::Tls(stream) => {
                let (r, w) = tokio::io::split(stream);
                (Box::new(r), Box::new(w))
            }
            StreamType::Unix(stream) => {
                let (r, w) = tokio::io::split(stream);
                (Box::new(r), Box::new(w))
            }
        }
    }
}

async fn connect_tls(host: &str, port: u16, cert: &str) -> Result<StreamType, NodeError> {
    // Load CA certificate
    let mut file = File::open(cert)?;
    let mut ca_cert = vec![];
    file.read_to_end(&mut ca_cert)?;
    let ca_cert = Certificate::from_pem(&ca_cert)?;

    let connector = TlsConnector::builder()
        .add_root_certificate(ca_cert)
        .build()?;
    let connector = tokio_native_tls::TlsConnector::from(connector);

    let stream = TcpStream::connect((host, port)).await?;
    Ok(StreamType::Tls(connector.connect(host, stream).await?))
}

async fn open_stream(endpoint: &Endpoint, ca_cert: Option<&str>) -> Result<StreamType, NodeError> {
    match endpoint {
        Endpoint::Tcp { host, port } => Ok(StreamType::Tcp(
            TcpStream::connect((host.as_str(), *port)).await?,
        )),
        Endpoint::Tls { host, port } => {
            let cert = ca_cert.ok_or_else(|| NodeError::Init {
                node: String::new(),
                reason: "tls master needs a CA certificate".to_string(),
            })?;
            connect_tls(host, *port, cert).await
        }
        Endpoint::Unix { path } => Ok(StreamType::Unix(UnixStream::connect(path).await?)),
    }
}

/// Middleware client speaking the frame protocol to a master.
///
/// A reader task owns the read half of the connection: deliveries go to the
/// inbox, acknowledgements to the request waiting for them.
pub struct TcpMiddleware {
    node: String,
    writer: BoxedWriter,
    acks: mpsc::UnboundedReceiver<Frame>,
    inbox: Arc<Inbox>,
    reader: Option<JoinHandle<Result<(), NodeError>>>,
    shutting_down: bool,
}

/// Connects to the master named in `options` and registers the node.
///
/// Any failure is returned as [`NodeError::Init`]; there is no retry.
pub async fn init(options: &NodeOptions) -> Result<TcpMiddleware, NodeError> {
    let node = options.fully_qualified_name();
    let init_error = |reason: String| NodeError::Init {
        node: node.clone(),
        reason,
    };

    let endpoint = Endpoint::parse(&options.master_uri).map_err(|e| init_error(e.to_string()))?;
    info!("connecting to master: {}", options.master_uri);
    let stream = match tokio::time::timeout(
        TIMEOUT,
        open_stream(&endpoint, options.ca_cert.as_deref()),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(NodeError::Init { reason, .. })) => return Err(init_error(reason)),
        Ok(Err(e)) => return Err(init_error(e.to_string())),
        Err(_) => return Err(init_error("connection timed out".to_string())),
    };

    let mut middleware = TcpMiddleware::from_stream(&node, stream);
    middleware
        .request(PktType::REGISTER, &node)
        .await
        .map_err(|e| init_error(e.to_string()))?;
    info!("node {} registered", node);
    Ok(middleware)
}

/// reads frames until the connection ends, routing each one.
async fn read_loop(
    mut reader: BoxedReader,
    inbox: Arc<Inbox>,
    acks: mpsc::UnboundedSender<Frame>,
) -> Result<(), NodeError> {
    let result = loop {
        let frame = match stream::read_frame(&mut reader).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };
        trace!("received {} for {}", frame.header.pkt_type, frame.topic);
        match frame.header.pkt_type {
            PktType::PUBLISH => {
                let topic = frame.topic.clone();
                match inbox.push(Delivery {
                    topic: frame.topic,
                    payload: frame.message,
                }) {
                    PushOutcome::Queued => {}
                    PushOutcome::DroppedOldest => {
                        warn!("queue for {} is full, dropped the oldest message", topic)
                    }
                    PushOutcome::NotSubscribed => {
                        debug!("discarding message on {}, not subscribed", topic)
                    }
                }
            }
            PktType::REGISTERACK
            | PktType::SUBSCRIBEACK
            | PktType::UNSUBSCRIBEACK
            | PktType::PUBLISHACK => {
                if acks.send(frame).is_err() {
                    debug!("acknowledgement arrived after the client went away");
                }
            }
            other => warn!("ignoring unexpected {} frame from the master", other),
        }
    };
    inbox.close();
    result
}

impl TcpMiddleware {
    fn from_stream(node: &str, stream: StreamType) -> TcpMiddleware {
        let (reader, writer) = stream.split();
        let inbox = Arc::new(Inbox::default());
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(reader, inbox.clone(), ack_tx));
        TcpMiddleware {
            node: node.to_string(),
            writer,
            acks: ack_rx,
            inbox,
            reader: Some(reader),
            shutting_down: false,
        }
    }

    /// name the node registered with.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// sends a request frame and waits for the matching acknowledgement.
    async fn request(&mut self, pkt_type: PktType, topic: &str) -> Result<(), NodeError> {
        let frame = Frame::new(pkt_type, topic, vec![])?;
        let expected = frame.ack()?;
        trace!("frame: {:?}", frame);
        stream::write_frame(&mut self.writer, &frame).await?;

        let wait = async {
            loop {
                match self.acks.recv().await {
                    Some(ack) if ack == expected => return Ok(()),
                    Some(ack) => warn!(
                        "skipping {} for {} while waiting for {}",
                        ack.header.pkt_type, ack.topic, expected.header.pkt_type
                    ),
                    None => return Err(NodeError::ConnectionClosed),
                }
            }
        };
        match tokio::time::timeout(TIMEOUT, wait).await {
            Ok(result) => result,
            Err(_) => Err(NodeError::Timeout(format!(
                "{} for {}",
                expected.header.pkt_type, topic
            ))),
        }
    }
}

impl Middleware for TcpMiddleware {
    async fn subscribe(&mut self, topic: &str, queue_depth: usize) -> Result<(), NodeError> {
        if queue_depth == 0 {
            return Err(NodeError::InvalidQueueDepth(queue_depth));
        }
        if !self.inbox.add_topic(topic, queue_depth) {
            debug!("already subscribed to {}, keeping the existing queue", topic);
            return Ok(());
        }
        if let Err(e) = self.request(PktType::SUBSCRIBE, topic).await {
            self.inbox.remove_topic(topic);
            return Err(e);
        }
        info!("subscribed to {} (queue depth {})", topic, queue_depth);
        Ok(())
    }

    async fn unsubscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.inbox.remove_topic(topic);
        self.request(PktType::UNSUBSCRIBE, topic).await?;
        info!("unsubscribed from {}", topic);
        Ok(())
    }

    async fn next_delivery(&mut self) -> Result<Option<Delivery>, NodeError> {
        if let Some(delivery) = self.inbox.pop().await {
            return Ok(Some(delivery));
        }
        if self.shutting_down {
            return Ok(None);
        }
        // the inbox only closes once the reader task is done
        let Some(reader) = self.reader.take() else {
            return Err(NodeError::ConnectionClosed);
        };
        match reader.await {
            Ok(Ok(())) => Err(NodeError::ConnectionClosed),
            Ok(Err(e)) => {
                error!("connection to the master failed: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("reader task failed: {}", e);
                Err(NodeError::ConnectionClosed)
            }
        }
    }

    async fn shutdown(&mut self) -> Result<(), NodeError> {
        self.shutting_down = true;
        let result = self.writer.shutdown().await;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.inbox.close();
        debug!("node {} shut down", self.node);
        result.map_err(NodeError::from)
    }
}

impl Drop for TcpMiddleware {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
