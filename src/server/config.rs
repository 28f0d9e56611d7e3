/// RTMP server configuration
use crate::{
    log::Logger,
    rtmp::{
        RTMP_CHUNK_SIZE_DEFAULT, RTMP_MAX_CHUNK_SIZE, RTMP_MAX_MESSAGE_SIZE_DEFAULT,
        RTMP_MIN_CHUNK_SIZE, RTMP_OUTBOUND_QUEUE_DEPTH_DEFAULT, RTMP_PEER_BANDWIDTH,
        RTMP_WINDOW_ACK,
    },
    utils::{get_env_bool, get_env_string, get_env_u32, IpRangeConfig, DEFAULT_MAX_ID_LENGTH},
};

const RTMP_PORT_DEFAULT: u32 = 1935;

const MAX_PORT: u32 = 65535;

const GOP_CACHE_SIZE_MB_DEFAULT: u32 = 256;

const CONNECT_TIMEOUT_SECONDS_DEFAULT: u32 = 5;

/// RTMP server configuration
#[derive(Clone)]
pub struct RtmpServerConfiguration {
    /// Port
    pub port: u32,

    /// Bind address
    pub bind_address: String,

    /// Max length for Ids and Keys
    pub id_max_length: usize,

    /// Whitelist of IPs to play
    pub play_whitelist: IpRangeConfig,

    /// RTMP out chunk size
    pub chunk_size: usize,

    /// Window acknowledgement size advertised to clients
    pub window_ack_size: u32,

    /// Peer bandwidth advertised to clients (dynamic limit type)
    pub peer_bandwidth: u32,

    /// Size limit in bytes of the GOP cache kept per channel
    pub gop_cache_size: usize,

    /// Maximum allowed size (bytes) of a reassembled RTMP message
    pub max_message_size: usize,

    /// Depth of the bounded outbound queue for each subscriber session
    pub outbound_queue_depth: usize,

    /// Seconds allowed for a client to complete the handshake and `connect` before the
    /// connection is dropped
    pub connect_timeout_seconds: u32,

    /// Max number of concurrent connections per IP address
    pub max_concurrent_connections_per_ip: u32,

    /// List of IP ranges not affected by the max number of concurrent connections limit.
    pub max_concurrent_connections_whitelist: IpRangeConfig,

    /// True to require C2 to echo S1 exactly. False accepts any C2 of the correct length,
    /// for clients that do not echo S1 verbatim.
    pub strict_handshake: bool,

    /// True to log requests
    pub log_requests: bool,
}

impl RtmpServerConfiguration {
    /// Loads configuration for environment variables
    ///
    /// # Arguments
    ///
    /// * `logger` - The logger
    pub fn load_from_env(logger: &Logger) -> Result<RtmpServerConfiguration, ()> {
        let port = get_env_u32("RTMP_PORT", RTMP_PORT_DEFAULT);

        if port == 0 || port > MAX_PORT {
            logger.log_error(&format!("RTMP_PORT has an invalid value: {}", port));
            return Err(());
        }

        let bind_address = get_env_string("BIND_ADDRESS", "0.0.0.0");

        let id_max_length = get_env_u32("ID_MAX_LENGTH", DEFAULT_MAX_ID_LENGTH as u32);

        let play_whitelist =
            match IpRangeConfig::new_from_string(&get_env_string("RTMP_PLAY_WHITELIST", "")) {
                Ok(pw) => pw,
                Err(s) => {
                    logger.log_error(&format!("RTMP_PLAY_WHITELIST has an invalid value: {}", s));
                    return Err(());
                }
            };

        let chunk_size = get_env_u32("RTMP_CHUNK_SIZE", RTMP_CHUNK_SIZE_DEFAULT) as usize;

        if !(RTMP_MIN_CHUNK_SIZE as usize..=RTMP_MAX_CHUNK_SIZE as usize).contains(&chunk_size) {
            logger.log_error(&format!(
                "RTMP_CHUNK_SIZE has an invalid value: {}. Min: {}. Max: {}",
                chunk_size, RTMP_MIN_CHUNK_SIZE, RTMP_MAX_CHUNK_SIZE
            ));
            return Err(());
        }

        let window_ack_size = get_env_u32("RTMP_WINDOW_ACK_SIZE", RTMP_WINDOW_ACK);
        let peer_bandwidth = get_env_u32("RTMP_PEER_BANDWIDTH", RTMP_PEER_BANDWIDTH);

        let gop_cache_size =
            (get_env_u32("GOP_CACHE_SIZE_MB", GOP_CACHE_SIZE_MB_DEFAULT) as usize) * 1024 * 1024;

        let max_message_size = get_env_u32(
            "RTMP_MAX_MESSAGE_SIZE",
            RTMP_MAX_MESSAGE_SIZE_DEFAULT as u32,
        ) as usize;

        let outbound_queue_depth = get_env_u32(
            "RTMP_OUTBOUND_QUEUE_DEPTH",
            RTMP_OUTBOUND_QUEUE_DEPTH_DEFAULT as u32,
        ) as usize;

        let connect_timeout_seconds =
            get_env_u32("RTMP_CONNECT_TIMEOUT_SECONDS", CONNECT_TIMEOUT_SECONDS_DEFAULT);

        let max_concurrent_connections_per_ip = get_env_u32("MAX_IP_CONCURRENT_CONNECTIONS", 4);

        let max_concurrent_connections_whitelist =
            match IpRangeConfig::new_from_string(&get_env_string("CONCURRENT_LIMIT_WHITELIST", ""))
            {
                Ok(cw) => cw,
                Err(s) => {
                    logger.log_error(&format!(
                        "CONCURRENT_LIMIT_WHITELIST has an invalid value: {}",
                        s
                    ));
                    return Err(());
                }
            };

        let strict_handshake = get_env_bool("RTMP_STRICT_HANDSHAKE", true);

        let log_requests = get_env_bool("LOG_REQUESTS", true);

        Ok(RtmpServerConfiguration {
            port,
            bind_address,
            id_max_length: id_max_length as usize,
            play_whitelist,
            chunk_size,
            window_ack_size,
            peer_bandwidth,
            gop_cache_size,
            max_message_size,
            outbound_queue_depth,
            connect_timeout_seconds,
            max_concurrent_connections_per_ip,
            max_concurrent_connections_whitelist,
            strict_handshake,
            log_requests,
        })
    }

    /// Gets the TCP address to listen on
    pub fn get_tcp_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
