// Context types to group parameters

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::session::SessionConsumer;

use super::{IpConnectionCounter, RtmpServerConfiguration, RtmpServerStatus, SessionIdGenerator};

/// RTMP server context
#[derive(Clone)]
pub struct RtmpServerContext {
    /// Server configuration
    pub config: Arc<RtmpServerConfiguration>,

    /// Server status
    pub status: Arc<Mutex<RtmpServerStatus>>,

    /// Consumer that every session forwards its publish/play events to.
    /// Defaults to a consumer that forwards into the broadcaster (`status`).
    pub consumer: Arc<dyn SessionConsumer>,
}

/// RTMP server context
#[derive(Clone)]
pub struct RtmpServerContextExtended {
    /// Server configuration
    pub config: Arc<RtmpServerConfiguration>,

    /// Server status
    pub status: Arc<Mutex<RtmpServerStatus>>,

    /// IP counter
    pub ip_counter: Arc<Mutex<IpConnectionCounter>>,

    /// Session ID generator
    pub session_id_generator: Arc<Mutex<SessionIdGenerator>>,

    /// Consumer that every session forwards its publish/play events to
    pub consumer: Arc<dyn SessionConsumer>,
}
