// Logic to handle RTMP sessions

use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::{mpsc, Mutex},
    time::{sleep_until, timeout, Instant},
};

use crate::{log::Logger, log_debug, rtmp::perform_handshake, server::RtmpServerContext};

use super::{
    handle_rtmp_packet, read_rtmp_chunk, spawn_task_to_read_session_messages,
    spawn_task_to_send_pings, RtmpSessionMessage, RtmpSessionReadStatus, SessionContext,
    SessionReadThreadContext,
};

/// Handles a RTMP session, from the handshake to the final cleanup
///
/// # Arguments
///
/// * `logger` - The session logger
/// * `server_context` - The server context
/// * `session_context` - The session context
/// * `read_stream` - The stream to read from the client
/// * `write_stream` - The stream to write to the client
pub async fn handle_rtmp_session<
    TR: AsyncRead + AsyncReadExt + Send + Sync + Unpin,
    TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin + 'static,
>(
    logger: Arc<Logger>,
    mut server_context: RtmpServerContext,
    session_context: SessionContext,
    mut read_stream: TR,
    write_stream: Arc<Mutex<TW>>,
) {
    let connect_timeout = Duration::from_secs(server_context.config.connect_timeout_seconds as u64);
    let connect_deadline = Instant::now() + connect_timeout;

    // Handshake

    {
        let mut write_stream_v = write_stream.lock().await;
        let handshake_result = timeout(
            connect_timeout,
            perform_handshake(
                &mut read_stream,
                &mut *write_stream_v,
                server_context.config.strict_handshake,
            ),
        )
        .await;
        drop(write_stream_v);

        match handshake_result {
            Ok(Ok(())) => {
                log_debug!(logger, "Handshake completed");
            }
            Ok(Err(e)) => {
                log_debug!(logger, format!("Handshake failed: {}", e));
                return;
            }
            Err(_) => {
                log_debug!(logger, "Handshake timed out");
                return;
            }
        }
    }

    // Channel used to deliver fan-out notifications (play/publish events) to this session

    let (session_msg_sender, session_msg_receiver) =
        mpsc::channel::<RtmpSessionMessage>(server_context.config.outbound_queue_depth);

    // Channel used to stop the ping task once the session ends

    let (cancel_pings_sender, cancel_pings_receiver) = mpsc::channel::<()>(1);

    spawn_task_to_send_pings(
        write_stream.clone(),
        server_context.config.clone(),
        session_context.status.clone(),
        cancel_pings_receiver,
        logger.clone(),
    );

    spawn_task_to_read_session_messages(
        write_stream.clone(),
        server_context.clone(),
        session_context.clone(),
        session_msg_receiver,
        logger.clone(),
    );

    let mut read_thread_context = SessionReadThreadContext {
        id: session_context.id,
        ip: session_context.ip,
        status: session_context.status.clone(),
        publish_status: session_context.publish_status.clone(),
        session_msg_sender,
        read_status: RtmpSessionReadStatus::new(),
    };

    // Main chunk read loop. Until the client has connected, bound the wait with the
    // configured connect timeout, so a client that completes the handshake and then
    // goes silent does not hold the session open forever.

    loop {
        if read_thread_context.is_killed().await {
            break;
        }

        let already_connected = read_thread_context.channel().await.is_some();

        let chunk_result = if already_connected {
            read_rtmp_chunk(
                &mut read_stream,
                &write_stream,
                &mut read_thread_context.read_status,
                server_context.config.window_ack_size,
                server_context.config.max_message_size,
            )
            .await
        } else {
            tokio::select! {
                res = read_rtmp_chunk(
                    &mut read_stream,
                    &write_stream,
                    &mut read_thread_context.read_status,
                    server_context.config.window_ack_size,
                    server_context.config.max_message_size,
                ) => res,
                _ = sleep_until(connect_deadline) => {
                    log_debug!(logger, "Connection dropped: connect timeout expired");
                    break;
                }
            }
        };

        match chunk_result {
            Ok(Some(packet)) => {
                let should_continue = handle_rtmp_packet(
                    &logger,
                    &mut server_context,
                    &mut read_thread_context,
                    &write_stream,
                    &packet,
                )
                .await;

                if !should_continue {
                    break;
                }
            }
            Ok(None) => {
                continue;
            }
            Err(e) => {
                log_debug!(logger, format!("Connection closed: {}", e));
                break;
            }
        }
    }

    // Tear down. Dropping the message sender unblocks the message reading task (which
    // performs the session cleanup once its receiver drains), and dropping the cancel
    // sender unblocks the ping task.

    drop(read_thread_context);
    drop(cancel_pings_sender);

    log_debug!(logger, "Session main loop ended");
}
