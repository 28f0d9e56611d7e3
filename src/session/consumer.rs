// Session consumer interface

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    rtmp::RtmpPacket,
    server::{add_player, set_channel_metadata, set_publisher, AddPlayerOptions, RtmpServerContext},
};

use super::SessionReadThreadContext;

/// Receives the events a session produces while publishing or playing, instead
/// of the session calling into the broadcaster directly.
///
/// Each session holds a reference to a consumer (`RtmpServerContext::consumer`).
/// The default consumer (`BroadcasterConsumer`) forwards every event into the
/// broadcaster (`server::status`), which is the only implementation this
/// server ships, but tests or embedders may supply their own.
#[async_trait]
pub trait SessionConsumer: Send + Sync {
    /// Called when an audio packet has been received from a publishing session
    async fn on_audio(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        packet: Arc<RtmpPacket>,
        is_header: bool,
    );

    /// Called when a video packet has been received from a publishing session
    async fn on_video(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        packet: Arc<RtmpPacket>,
        is_header: bool,
    );

    /// Called when metadata (`onMetaData`) has been received from a publishing session
    async fn on_metadata(
        &self,
        server_context: &RtmpServerContext,
        channel: &str,
        publisher_id: u64,
        metadata: Arc<Vec<u8>>,
    );

    /// Called when a session issues `publish` for a channel under a stream key
    ///
    /// Returns true on success, false if the channel is already being published
    async fn on_publish(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        channel: &str,
        key: &str,
    ) -> bool;

    /// Called when a session issues `play` for a channel under a stream key
    ///
    /// Returns true on success, false if the provided key is invalid
    async fn on_play(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        channel: &str,
        key: &str,
        options: AddPlayerOptions,
    ) -> bool;
}

/// Default session consumer: forwards every event into the broadcaster
pub struct BroadcasterConsumer;

#[async_trait]
impl SessionConsumer for BroadcasterConsumer {
    async fn on_audio(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        packet: Arc<RtmpPacket>,
        is_header: bool,
    ) {
        let channel_status_mu = match &session_context.read_status.channel_status {
            Some(s) => s.clone(),
            None => return,
        };

        let mut channel_status = channel_status_mu.lock().await;

        channel_status
            .send_packet(
                session_context.id,
                packet,
                is_header,
                server_context.config.gop_cache_size,
            )
            .await;
    }

    async fn on_video(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        packet: Arc<RtmpPacket>,
        is_header: bool,
    ) {
        let channel_status_mu = match &session_context.read_status.channel_status {
            Some(s) => s.clone(),
            None => return,
        };

        let mut channel_status = channel_status_mu.lock().await;

        channel_status
            .send_packet(
                session_context.id,
                packet,
                is_header,
                server_context.config.gop_cache_size,
            )
            .await;
    }

    async fn on_metadata(
        &self,
        server_context: &RtmpServerContext,
        channel: &str,
        publisher_id: u64,
        metadata: Arc<Vec<u8>>,
    ) {
        set_channel_metadata(server_context, channel, publisher_id, metadata).await;
    }

    async fn on_publish(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        channel: &str,
        key: &str,
    ) -> bool {
        set_publisher(server_context, session_context, channel, key, key).await
    }

    async fn on_play(
        &self,
        server_context: &RtmpServerContext,
        session_context: &mut SessionReadThreadContext,
        channel: &str,
        key: &str,
        options: AddPlayerOptions,
    ) -> bool {
        add_player(server_context, session_context, channel, key, options).await
    }
}
