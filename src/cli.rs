use clap::Parser;

/// log level for the node
#[derive(clap::ValueEnum, Clone)]
pub enum LogLevel {
    Trace,
    Warn,
    Info,
    Error,
    Debug,
}

/// subscribes to one topic and logs every message it hears.
///
/// `key:=value` arguments are handed to the node: `__name:=`, `__ns:=`,
/// `__master:=` and topic remappings such as `/vicon/Jet/Jet:=/vicon/Wing/Wing`.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// topic to listen on
    #[clap(short, long, default_value = "/vicon/Jet/Jet")]
    pub topic: String,

    /// messages buffered before the oldest is dropped
    #[clap(short, long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub queue_depth: u32,

    /// node name
    #[clap(short, long, default_value = "sub")]
    pub name: String,

    /// append a random suffix to the node name
    #[clap(long)]
    pub anonymous: bool,

    /// CA certificate (PEM) for tls:// masters
    #[clap(short, long)]
    pub cert: Option<String>,

    /// log level, default: info
    #[clap(long, global = true)]
    pub log_level: Option<LogLevel>,
}
