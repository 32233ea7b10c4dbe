pub mod args;
pub mod client;
pub mod error;
pub mod middleware;
pub mod msgs;
pub mod node;
pub mod stream;
pub use listener_node_wire::header::Header;
pub use listener_node_wire::message::Frame;
pub use listener_node_wire::PktType;
pub use node::NodeHandle;
