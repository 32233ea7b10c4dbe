pub mod cli;
use crate::cli::{Cli, LogLevel};
use clap::Parser;
use listener_node::args::{self, NodeOptions};
use listener_node::client;
use listener_node::node::{self, ListenerConfig};
use log::{error, info};
use std::env;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // `key:=value` arguments belong to the node, the rest to the command line
    let (node_args, cli_args): (Vec<String>, Vec<String>) =
        env::args().partition(|arg| args::is_node_argument(arg));
    let cli = Cli::parse_from(cli_args);

    let log_level: &str = match cli.log_level {
        Some(LogLevel::Trace) => "trace",
        Some(LogLevel::Warn) => "warn",
        Some(LogLevel::Info) => "info",
        Some(LogLevel::Error) => "error",
        Some(LogLevel::Debug) => "debug",
        None => "info",
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    let mut options = match NodeOptions::from_args(
        &cli.name,
        cli.anonymous,
        env::var(args::MASTER_URI_ENV).ok(),
        &node_args,
    ) {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    options.ca_cert = cli.cert.clone();

    let config = ListenerConfig {
        topic: cli.topic.clone(),
        queue_depth: cli.queue_depth as usize,
    };
    info!(
        "starting {} on {}",
        options.fully_qualified_name(),
        options.master_uri
    );

    let result = node::run(
        options,
        &config,
        |options| async move { client::init(&options).await },
        node::shutdown_signal(),
    )
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
