mod common;

use listener_node::args::NodeOptions;
use listener_node::node::{self, ListenerConfig};
use log::{Level, Log, Metadata, Record};
use std::future::pending;
use std::sync::Mutex;

/// keeps the lines logged by the message callback.
struct Capture {
    lines: Mutex<Vec<String>>,
}

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if record.target() == "listener_node::msgs" {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

// the only test in this binary, the logger is process wide
#[tokio::test]
async fn one_log_line_per_message_in_order() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(log::LevelFilter::Info);

    let config = ListenerConfig::default();
    let (middleware, remote) = common::mock();
    let texts = ["x: 0.10 y: 0.20", "x: 0.11 y: 0.19", "", "[brackets]", "x: 0.12 y: 0.18"];
    for text in texts {
        remote.deliver(&config.topic, text);
    }
    drop(remote);

    node::run(
        NodeOptions::new("sub"),
        &config,
        move |_| async move { Ok(middleware) },
        pending(),
    )
    .await
    .unwrap();

    let expected: Vec<String> = texts.iter().map(|t| format!("I heard: [{}]", t)).collect();
    assert_eq!(*CAPTURE.lines.lock().unwrap(), expected);
}
