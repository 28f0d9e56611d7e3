// Publish command

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use crate::{
    log::Logger,
    log_debug, log_info,
    rtmp::{RtmpCommand, RtmpPacket},
    server::{check_channel_publishing_status, RtmpServerContext},
    utils::validate_id_string,
};

use super::super::{send_status_message, SessionReadThreadContext};

/// Handles RTMP command: PUBLISH
///
/// # Arguments
///
/// * `logger` - The session logger
/// * `server_context` - The server context
/// * `session_context` - The session context
/// * `write_stream` - The stream to write to the client
/// * `packet` - The packet that contained the command
/// * `cmd` - The command
///
/// # Return value
///
/// Returns true to continue receiving chunks. Returns false to end the session main loop.
pub async fn handle_rtmp_command_publish<
    TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin + 'static,
>(
    logger: &Logger,
    server_context: &mut RtmpServerContext,
    session_context: &mut SessionReadThreadContext,
    write_stream: &Mutex<TW>,
    packet: &RtmpPacket,
    cmd: &RtmpCommand,
) -> bool {
    // Load and validate parameters

    let publish_stream_id = packet.header.stream_id;

    let channel = match session_context.channel().await {
        Some(c) => c,
        None => {
            log_debug!(logger, "Protocol error: Received publish before connect");

            if let Err(e) = send_status_message(
                write_stream,
                publish_stream_id,
                "error",
                "NetStream.Publish.BadConnection",
                Some("No channel is selected"),
                server_context.config.chunk_size,
            )
            .await
            {
                log_debug!(
                    logger,
                    format!("Send error: Could not send status message: {}", e)
                );
            }

            return false;
        }
    };

    let key = match cmd.get_argument("streamName") {
        Some(k) => {
            let k_parts: Vec<&str> = k.get_string().split("?").collect();

            if !k_parts.is_empty() {
                k_parts[0]
            } else {
                k.get_string()
            }
        }
        None => {
            log_debug!(logger, "Command error: streamName property not provided");

            if let Err(e) = send_status_message(
                write_stream,
                publish_stream_id,
                "error",
                "NetStream.Publish.BadName",
                Some("No stream key provided"),
                server_context.config.chunk_size,
            )
            .await
            {
                log_debug!(
                    logger,
                    format!("Send error: Could not send status message: {}", e)
                );
            }

            return false;
        }
    };

    let publish_type = match cmd.get_argument("type") {
        Some(t) => t.get_string().to_string(),
        None => "live".to_string(),
    };

    if publish_type != "live" {
        log_debug!(
            logger,
            format!("Command error: Unsupported publish type: {}", publish_type)
        );

        if let Err(e) = send_status_message(
            write_stream,
            publish_stream_id,
            "error",
            "NetStream.Publish.BadName",
            Some("Only live publishing is supported"),
            server_context.config.chunk_size,
        )
        .await
        {
            log_debug!(
                logger,
                format!("Send error: Could not send status message: {}", e)
            );
        }

        return false;
    }

    if !validate_id_string(key, server_context.config.id_max_length) {
        log_debug!(
            logger,
            format!("Command error: Invalid streamName value: {}", key)
        );

        if let Err(e) = send_status_message(
            write_stream,
            publish_stream_id,
            "error",
            "NetStream.Publish.BadName",
            Some("Invalid stream key provided"),
            server_context.config.chunk_size,
        )
        .await
        {
            log_debug!(
                logger,
                format!("Send error: Could not send status message: {}", e)
            );
        }

        return false;
    }

    // Ensure the session is not already publishing

    if session_context.is_publisher().await {
        log_debug!(
            logger,
            "Protocol error: Received publish command, but already publishing"
        );

        if let Err(e) = send_status_message(
            write_stream,
            publish_stream_id,
            "error",
            "NetStream.Publish.BadConnection",
            Some("Connection already publishing"),
            server_context.config.chunk_size,
        )
        .await
        {
            log_debug!(
                logger,
                format!("Send error: Could not send status message: {}", e)
            );
        }

        return false;
    }

    // Ensure the channel is free to publish

    if check_channel_publishing_status(server_context, &channel).await {
        log_debug!(
            logger,
            "Cannot publish: Another session is already publishing on the channel"
        );

        if let Err(e) = send_status_message(
            write_stream,
            publish_stream_id,
            "error",
            "NetStream.Publish.BadName",
            Some("Stream already publishing"),
            server_context.config.chunk_size,
        )
        .await
        {
            log_debug!(
                logger,
                format!("Send error: Could not send status message: {}", e)
            );
        }

        // PublisherInUse is a non-fatal business error: the session stays connected
        return true;
    }

    // Log

    log_info!(logger, format!("PUBLISH ({}): {}", publish_stream_id, &channel));

    // Set publisher into the server status

    let consumer = server_context.consumer.clone();

    if !consumer
        .on_publish(server_context, session_context, &channel, key)
        .await
    {
        log_debug!(
            logger,
            "Cannot publish: Another session is already publishing on the channel"
        );

        if let Err(e) = send_status_message(
            write_stream,
            publish_stream_id,
            "error",
            "NetStream.Publish.BadName",
            Some("Stream already publishing"),
            server_context.config.chunk_size,
        )
        .await
        {
            log_debug!(
                logger,
                format!("Send error: Could not send status message: {}", e)
            );
        }

        // PublisherInUse is a non-fatal business error: the session stays connected
        return true;
    }

    // Set publishing status to the session status

    session_context.set_publisher(publish_stream_id, key).await;

    // Respond with status message

    if let Err(e) = send_status_message(
        write_stream,
        publish_stream_id,
        "status",
        "NetStream.Publish.Start",
        Some(&format!("/{}/{} is now published.", channel, key)),
        server_context.config.chunk_size,
    )
    .await
    {
        log_debug!(
            logger,
            format!("Send error: Could not send status message: {}", e)
        );
    }

    // Done

    true
}
