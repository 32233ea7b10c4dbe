#![allow(dead_code)]

use listener_node::error::NodeError;
use listener_node::middleware::{Delivery, Middleware};
use listener_node::stream::{read_frame, write_frame};
use listener_node::{Frame, PktType};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::mpsc;

/// calls the node made on the mock, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Subscribe(String, usize),
    Unsubscribe(String),
    NextDelivery,
    Shutdown,
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

/// in-memory middleware: deliveries come from a channel, dropping the
/// sender shuts the middleware down.
pub struct MockMiddleware {
    pub calls: Calls,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
}

pub struct MockRemote {
    pub calls: Calls,
    pub tx: mpsc::UnboundedSender<Delivery>,
}

impl MockRemote {
    pub fn deliver(&self, topic: &str, text: &str) {
        self.deliver_bytes(topic, text.as_bytes());
    }

    pub fn deliver_bytes(&self, topic: &str, payload: &[u8]) {
        self.tx
            .send(Delivery {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            })
            .unwrap();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn mock() -> (MockMiddleware, MockRemote) {
    let calls: Calls = Arc::default();
    let (tx, rx) = mpsc::unbounded_channel();
    (
        MockMiddleware {
            calls: calls.clone(),
            deliveries: rx,
        },
        MockRemote { calls, tx },
    )
}

impl MockMiddleware {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Middleware for MockMiddleware {
    async fn subscribe(&mut self, topic: &str, queue_depth: usize) -> Result<(), NodeError> {
        self.record(Call::Subscribe(topic.to_string(), queue_depth));
        Ok(())
    }

    async fn unsubscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.record(Call::Unsubscribe(topic.to_string()));
        Ok(())
    }

    async fn next_delivery(&mut self) -> Result<Option<Delivery>, NodeError> {
        self.record(Call::NextDelivery);
        Ok(self.deliveries.recv().await)
    }

    async fn shutdown(&mut self) -> Result<(), NodeError> {
        self.record(Call::Shutdown);
        Ok(())
    }
}

/// what the test asks the fake broker to do.
pub enum Command {
    Publish(Frame),
    Close,
}

/// A broker stand-in serving one client: acknowledges requests and
/// forwards frames the test publishes.
pub struct FakeBroker {
    /// `tcp://...` or `unix://...`
    pub uri: String,
    pub received: Arc<Mutex<Vec<Frame>>>,
    commands: mpsc::UnboundedSender<Command>,
}

impl FakeBroker {
    pub fn publish(&self, topic: &str, text: &str) {
        let frame = Frame::new(PktType::PUBLISH, topic, text.as_bytes().to_vec()).unwrap();
        self.commands.send(Command::Publish(frame)).unwrap();
    }

    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    pub fn received_types(&self) -> Vec<(PktType, String)> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|f| (f.header.pkt_type, f.topic.clone()))
            .collect()
    }
}

async fn serve<S>(
    stream: S,
    ack: bool,
    received: Arc<Mutex<Vec<Frame>>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let (incoming_tx, mut incoming) = mpsc::unbounded_channel();
    let read_task = tokio::spawn(async move {
        while let Ok(Some(frame)) = read_frame(&mut reader).await {
            if incoming_tx.send(frame).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = incoming.recv() => {
                let Some(frame) = frame else { break };
                received.lock().unwrap().push(frame.clone());
                if ack {
                    write_frame(&mut writer, &frame.ack().unwrap()).await.unwrap();
                }
            }
            command = commands.recv() => match command {
                Some(Command::Publish(frame)) => write_frame(&mut writer, &frame).await.unwrap(),
                Some(Command::Close) | None => break,
            }
        }
    }
    read_task.abort();
}

/// starts a broker on an ephemeral localhost port. with `ack` false the broker
/// reads requests but never answers them.
pub async fn tcp_broker(ack: bool) -> FakeBroker {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let uri = format!("tcp://{}", listener.local_addr().unwrap());
    let received: Arc<Mutex<Vec<Frame>>> = Arc::default();
    let (tx, rx) = mpsc::unbounded_channel();

    let frames = received.clone();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        serve(socket, ack, frames, rx).await;
    });
    FakeBroker {
        uri,
        received,
        commands: tx,
    }
}

/// starts a broker on a fresh unix socket under the temp dir.
pub async fn unix_broker(name: &str) -> FakeBroker {
    let path = std::env::temp_dir().join(format!("{}-{}.sock", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).unwrap();
    let uri = format!("unix://{}", path.display());
    let received: Arc<Mutex<Vec<Frame>>> = Arc::default();
    let (tx, rx) = mpsc::unbounded_channel();

    let frames = received.clone();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        serve(socket, true, frames, rx).await;
    });
    FakeBroker {
        uri,
        received,
        commands: tx,
    }
}
