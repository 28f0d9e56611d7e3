// TCP server

use std::{net::IpAddr, sync::Arc};

use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{mpsc::Sender, Mutex},
};

use crate::{log::Logger, session::SessionConsumer};

use super::{
    handle_connection, IpConnectionCounter, RtmpServerConfiguration, RtmpServerContextExtended,
    RtmpServerStatus, SessionIdGenerator,
};

/// Run the TCP server
pub fn tcp_server(
    logger: Arc<Logger>,
    config: Arc<RtmpServerConfiguration>,
    server_status: Arc<Mutex<RtmpServerStatus>>,
    ip_counter: Arc<Mutex<IpConnectionCounter>>,
    session_id_generator: Arc<Mutex<SessionIdGenerator>>,
    consumer: Arc<dyn SessionConsumer>,
    end_notifier: Sender<()>,
) {
    tokio::spawn(async move {
        let listen_addr = config.get_tcp_listen_addr();

        // Create listener
        let listener_res = TcpListener::bind(&listen_addr).await;
        let listener: TcpListener;

        match listener_res {
            Ok(l) => {
                listener = l;
            }
            Err(e) => {
                logger.log_error(&format!("Could not create TCP listener: {}", e));
                end_notifier
                    .send(())
                    .await
                    .expect("failed to notify to main thread");
                return;
            }
        }

        logger.log_info(&format!("Listening on {}", listen_addr));

        let server_context = RtmpServerContextExtended {
            config: config.clone(),
            status: server_status,
            ip_counter: ip_counter.clone(),
            session_id_generator,
            consumer,
        };

        loop {
            let accept_res = listener.accept().await;

            match accept_res {
                Ok((connection, addr)) => {
                    // Handle connection
                    handle_connection_tcp(
                        connection,
                        addr.ip(),
                        config.clone(),
                        server_context.clone(),
                        logger.clone(),
                    );
                }
                Err(e) => {
                    logger.log_error(&format!("Could not accept connection: {}", e));
                    end_notifier
                        .send(())
                        .await
                        .expect("failed to notify to main thread");
                    return;
                }
            }
        }
    });
}

fn handle_connection_tcp(
    connection: TcpStream,
    ip: IpAddr,
    config: Arc<RtmpServerConfiguration>,
    server_context: RtmpServerContextExtended,
    logger: Arc<Logger>,
) {
    tokio::spawn(async move {
        let is_exempted = config
            .as_ref()
            .max_concurrent_connections_whitelist
            .contains_ip(&ip);
        let mut should_accept = true;

        if !is_exempted {
            let mut ip_counter_v = server_context.ip_counter.as_ref().lock().await;
            should_accept = (*ip_counter_v).add(&ip);
            drop(ip_counter_v);
        }

        if should_accept {
            let (read_stream, write_stream) = connection.into_split();
            let write_stream = Arc::new(Mutex::new(write_stream));

            // Handle connection
            handle_connection(
                logger.clone(),
                server_context.clone(),
                read_stream,
                write_stream.clone(),
                ip,
            )
            .await;

            // Ensure connection is closed
            let mut write_stream_v = write_stream.lock().await;
            let _ = write_stream_v.shutdown().await;
            drop(write_stream_v);

            // After connection is closed, remove from ip counter
            if !is_exempted {
                let mut ip_counter_v = server_context.ip_counter.as_ref().lock().await;
                (*ip_counter_v).remove(&ip);
                drop(ip_counter_v);
            }
        } else {
            if config.log_requests {
                logger.as_ref().log_info(&format!(
                    "Rejected request from {} due to connection limit",
                    ip
                ));
            }
            let _ = connection.shutdown().await;
        }
    });
}
