// Logic to handle data packets (onMetaData / @setDataFrame)

use std::sync::Arc;

use crate::{
    log::Logger,
    log_debug, log_trace,
    rtmp::{rtmp_build_metadata, RtmpData, RtmpPacket},
    server::RtmpServerContext,
};

use super::SessionReadThreadContext;

/// Handles DATA RTMP packet
///
/// # Arguments
///
/// * `logger` - The session logger
/// * `server_context` - The server context
/// * `session_context` - The session context
/// * `packet` - The packet
///
/// # Return value
///
/// Returns true to continue receiving chunks. Returns false to end the session main loop.
pub async fn handle_rtmp_packet_data(
    logger: &Logger,
    server_context: &mut RtmpServerContext,
    session_context: &mut SessionReadThreadContext,
    packet: &RtmpPacket,
) -> bool {
    if !session_context.is_publisher().await {
        log_debug!(logger, "Data packet ignored since it was not publishing");

        return true;
    }

    let channel = match session_context.channel().await {
        Some(c) => c,
        None => {
            return true;
        }
    };

    let data = match RtmpData::decode(&packet.payload) {
        Ok(d) => d,
        Err(_) => {
            log_debug!(logger, "Data error: Could not decode AMF data message");

            return true;
        }
    };

    log_trace!(logger, format!("DATA MESSAGE: {}", data.tag));

    let metadata_bytes: Option<Vec<u8>> = match data.tag.as_str() {
        "@setDataFrame" => {
            if data.get_argument("method").map(|m| m.get_string()) == Some("onMetaData") {
                Some(rtmp_build_metadata(&data))
            } else {
                None
            }
        }
        "onMetaData" => Some(rtmp_build_metadata(&data)),
        _ => None,
    };

    if let Some(metadata) = metadata_bytes {
        let consumer = server_context.consumer.clone();

        consumer
            .on_metadata(server_context, &channel, session_context.id, Arc::new(metadata))
            .await;
    }

    // Done

    true
}
