use listener_node::args::NodeOptions;
use listener_node::client;
use listener_node::msgs::StringMsg;
use listener_node::NodeHandle;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let mut options = NodeOptions::new("demo_listener");
    options.master_uri = "unix:///tmp/listener.sock".to_string();

    // initialize the node.
    let middleware = client::init(&options).await?;
    let mut node = NodeHandle::new(options, middleware);

    // subscribe to the given topic.
    node.subscribe("/chatter", 10, |msg: &StringMsg| {
        println!("chatter: {}", msg.data);
    })
    .await?;

    node.spin().await?;
    node.shutdown().await?;
    Ok(())
}
