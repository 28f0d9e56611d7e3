// RTMP server

mod config;
mod connection_handle;
mod context;
mod ip_count;
mod session_id_generator;
mod status;
mod tcp;
mod utils;

use std::sync::Arc;

pub use config::*;
pub use connection_handle::*;
pub use context::*;
pub use ip_count::*;
pub use session_id_generator::*;
pub use status::*;
pub use tcp::*;
pub use utils::*;
use tokio::sync::Mutex;

use crate::{log::Logger, session::BroadcasterConsumer};

/// Runs the RTMP server
pub async fn run_server(
    logger: Logger,
    config: Arc<RtmpServerConfiguration>,
    server_status: Arc<Mutex<RtmpServerStatus>>,
) {
    let ip_counter = Arc::new(Mutex::new(IpConnectionCounter::new(config.as_ref())));
    let session_id_generator = Arc::new(Mutex::new(SessionIdGenerator::new()));
    let consumer = Arc::new(BroadcasterConsumer);

    let (end_notifier_tcp, mut end_receiver_tcp) = tokio::sync::mpsc::channel::<()>(1);

    tcp_server(
        Arc::new(logger.make_child_logger("[SERVER:TCP] ")),
        config.clone(),
        server_status.clone(),
        ip_counter.clone(),
        session_id_generator.clone(),
        consumer,
        end_notifier_tcp,
    );

    end_receiver_tcp
        .recv()
        .await
        .expect("could not receive signal from TCP server thread");
}
