// Packet dispatch logic

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use crate::{
    log::Logger,
    log_debug,
    rtmp::{
        RtmpCommand, RtmpPacket, RTMP_MAX_CHUNK_SIZE, RTMP_MIN_CHUNK_SIZE, RTMP_TYPE_ABORT,
        RTMP_TYPE_ACKNOWLEDGEMENT, RTMP_TYPE_AUDIO, RTMP_TYPE_DATA, RTMP_TYPE_EVENT,
        RTMP_TYPE_FLEX_MESSAGE, RTMP_TYPE_FLEX_STREAM, RTMP_TYPE_INVOKE,
        RTMP_TYPE_SET_CHUNK_SIZE, RTMP_TYPE_SET_PEER_BANDWIDTH, RTMP_TYPE_VIDEO,
        RTMP_TYPE_WINDOW_ACKNOWLEDGEMENT_SIZE,
    },
    server::RtmpServerContext,
};

use super::{
    handle_rtmp_command_close_stream, handle_rtmp_command_connect,
    handle_rtmp_command_create_stream, handle_rtmp_command_delete_stream,
    handle_rtmp_command_pause, handle_rtmp_command_play, handle_rtmp_command_publish,
    handle_rtmp_command_receive_audio, handle_rtmp_command_receive_video,
    handle_rtmp_packet_audio, handle_rtmp_packet_data, handle_rtmp_packet_video,
    SessionReadThreadContext,
};

/// Handles a fully reassembled RTMP packet
///
/// # Arguments
///
/// * `logger` - The session logger
/// * `server_context` - The server context
/// * `session_context` - The session context
/// * `write_stream` - The stream to write to the client
/// * `packet` - The packet to handle
///
/// # Return value
///
/// Returns true to continue receiving chunks. Returns false to end the session main loop.
pub async fn handle_rtmp_packet<TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin + 'static>(
    logger: &Logger,
    server_context: &mut RtmpServerContext,
    session_context: &mut SessionReadThreadContext,
    write_stream: &Mutex<TW>,
    packet: &RtmpPacket,
) -> bool {
    match packet.header.packet_type {
        RTMP_TYPE_SET_CHUNK_SIZE => {
            if packet.payload.len() < 4 {
                log_debug!(logger, "Protocol error: Set Chunk Size message too short");
                return false;
            }

            let new_chunk_size = u32::from_be_bytes([
                packet.payload[0],
                packet.payload[1],
                packet.payload[2],
                packet.payload[3],
            ]) & 0x7fffffff;

            if !(RTMP_MIN_CHUNK_SIZE..=RTMP_MAX_CHUNK_SIZE).contains(&new_chunk_size) {
                log_debug!(
                    logger,
                    format!("Protocol error: Invalid chunk size: {}", new_chunk_size)
                );
                return false;
            }

            session_context.read_status.in_chunk_size = new_chunk_size as usize;

            true
        }
        RTMP_TYPE_ABORT => {
            if packet.payload.len() < 4 {
                return true;
            }

            let csid = u32::from_be_bytes([
                packet.payload[0],
                packet.payload[1],
                packet.payload[2],
                packet.payload[3],
            ]);

            session_context.read_status.discard_chunk_stream(csid);

            true
        }
        RTMP_TYPE_ACKNOWLEDGEMENT | RTMP_TYPE_WINDOW_ACKNOWLEDGEMENT_SIZE
        | RTMP_TYPE_SET_PEER_BANDWIDTH | RTMP_TYPE_EVENT => {
            // Informational messages sent by well behaved clients, nothing to act on
            true
        }
        RTMP_TYPE_AUDIO => {
            handle_rtmp_packet_audio(logger, server_context, session_context, packet).await
        }
        RTMP_TYPE_VIDEO => {
            handle_rtmp_packet_video(logger, server_context, session_context, packet).await
        }
        RTMP_TYPE_DATA => {
            handle_rtmp_packet_data(logger, server_context, session_context, packet).await
        }
        RTMP_TYPE_FLEX_STREAM => {
            if packet.payload.is_empty() {
                return true;
            }

            let mut stripped = RtmpPacket::new_blank();
            stripped.header = packet.header.clone();
            stripped.payload = packet.payload[1..].to_vec();

            handle_rtmp_packet_data(logger, server_context, session_context, &stripped).await
        }
        RTMP_TYPE_INVOKE => {
            handle_rtmp_invoke_payload(
                logger,
                server_context,
                session_context,
                write_stream,
                packet,
                &packet.payload,
            )
            .await
        }
        RTMP_TYPE_FLEX_MESSAGE => {
            if packet.payload.is_empty() {
                return true;
            }

            handle_rtmp_invoke_payload(
                logger,
                server_context,
                session_context,
                write_stream,
                packet,
                &packet.payload[1..],
            )
            .await
        }
        _ => {
            // Unknown or unsupported message type: ignore and keep the session alive
            true
        }
    }
}

/// Decodes an AMF0 command from a command/invoke payload and dispatches it
async fn handle_rtmp_invoke_payload<
    TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin + 'static,
>(
    logger: &Logger,
    server_context: &mut RtmpServerContext,
    session_context: &mut SessionReadThreadContext,
    write_stream: &Mutex<TW>,
    packet: &RtmpPacket,
    payload: &[u8],
) -> bool {
    let cmd = match RtmpCommand::decode(payload) {
        Ok(c) => c,
        Err(_) => {
            log_debug!(logger, "Command error: Could not decode AMF command message");

            return true;
        }
    };

    if logger.config.trace_enabled {
        logger.log_trace(&cmd.to_debug_string());
    }

    match cmd.cmd.as_str() {
        "connect" => {
            handle_rtmp_command_connect(logger, server_context, session_context, write_stream, &cmd)
                .await
        }
        "createStream" => {
            handle_rtmp_command_create_stream(
                logger,
                server_context,
                session_context,
                write_stream,
                &cmd,
            )
            .await
        }
        "publish" => {
            handle_rtmp_command_publish(
                logger,
                server_context,
                session_context,
                write_stream,
                packet,
                &cmd,
            )
            .await
        }
        "play" => {
            handle_rtmp_command_play(
                logger,
                server_context,
                session_context,
                write_stream,
                packet,
                &cmd,
            )
            .await
        }
        "pause" | "pause2" => {
            handle_rtmp_command_pause(logger, server_context, session_context, &cmd).await
        }
        "receiveAudio" => {
            handle_rtmp_command_receive_audio(logger, server_context, session_context, &cmd).await
        }
        "receiveVideo" => {
            handle_rtmp_command_receive_video(logger, server_context, session_context, &cmd).await
        }
        "closeStream" => {
            handle_rtmp_command_close_stream(
                logger,
                server_context,
                session_context,
                write_stream,
                packet,
            )
            .await
        }
        "deleteStream" => {
            handle_rtmp_command_delete_stream(
                logger,
                server_context,
                session_context,
                write_stream,
                &cmd,
            )
            .await
        }
        // Commands sent by encoders that do not require a specific response:
        // FCPublish, FCUnpublish, FCSubscribe, releaseStream, _checkbw, etc.
        _ => true,
    }
}
