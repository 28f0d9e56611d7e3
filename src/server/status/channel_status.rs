use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc::Sender, Mutex};

use crate::{rtmp::{RtmpPacket, RTMP_TYPE_AUDIO, RTMP_TYPE_VIDEO}, session::{RtmpSessionMessage, RtmpSessionPublishStreamStatus}};

/// Status of an RTMP player
pub struct RtmpPlayerStatus {
    /// Provided stream key
    pub provided_key: String,

    /// Message sender to communicate with the player session
    pub message_sender: Sender<RtmpSessionMessage>,

    /// True if the player wishes to clear the GOP cache
    pub gop_clear: bool,

    /// True if paused
    pub paused: bool,

    /// True if idle
    pub idle: bool,

    /// True to receive audio
    pub receive_audio: bool,

    /// True to receive video
    pub receive_video: bool,
}

/// RTMP channel status
pub struct RtmpChannelStatus {
    /// Channel key
    pub key: Option<String>,

    /// Current stream ID
    pub stream_id: Option<String>,

    /// True if publishing
    pub publishing: bool,

    /// ID of the publisher session
    pub publisher_id: Option<u64>,

    /// Message sender for the publisher session
    pub publisher_message_sender: Option<Sender<RtmpSessionMessage>>,

    /// Status of the published stream
    pub publish_status: Option<Arc<Mutex<RtmpSessionPublishStreamStatus>>>,

    /// Players
    pub players: HashMap<u64, RtmpPlayerStatus>,
}

impl RtmpChannelStatus {
    /// Creates a new instance of RtmpChannelStatus
    pub fn new() -> RtmpChannelStatus {
        RtmpChannelStatus {
            publishing: false,
            key: None,
            stream_id: None,
            publisher_id: None,
            publisher_message_sender: None,
            publish_status: None,
            players: HashMap::new(),
        }
    }

    /// Sends a packet to players and stored it in the GOP cache if applicable
    ///
    /// Players whose outbound queue is full are dropped rather than awaited on, so a
    /// slow subscriber never slows down the publisher.
    ///
    /// # Arguments
    ///
    /// * `publisher_id` - ID of the publisher sending the packet
    /// * `packet` - Packet to send
    /// * `skip_cache` - True if the packet should not be added to the GOP cache
    /// * `gop_cache_size` - The max size of the GOP cache (server config)
    pub async fn send_packet(
        &mut self,
        publisher_id: u64,
        packet: Arc<RtmpPacket>,
        skip_cache: bool,
        gop_cache_size: usize,
    ) {
        if !self.publishing {
            return;
        }

        if let Some(pid) = self.publisher_id {
            if pid != publisher_id {
                return; // Not the publisher session
            }
        }

        let publish_status = match &self.publish_status {
            Some(s) => s,
            None => {
                return;
            }
        };

        if !skip_cache {
            RtmpSessionPublishStreamStatus::push_new_packet(
                publish_status,
                packet.clone(),
                gop_cache_size,
            )
            .await;
        }

        // Send packet to players

        let mut overflowed: Vec<u64> = Vec::new();

        for (player_id, player) in &self.players {
            if player.paused {
                continue;
            }

            if packet.header.packet_type == RTMP_TYPE_AUDIO && !player.receive_audio {
                continue;
            }

            if packet.header.packet_type == RTMP_TYPE_VIDEO && !player.receive_video {
                continue;
            }

            if player
                .message_sender
                .try_send(RtmpSessionMessage::PlayPacket {
                    packet: packet.clone(),
                })
                .is_err()
            {
                // Outbound queue is full (or the session has already ended): drop the
                // subscriber instead of blocking the publisher on it
                overflowed.push(*player_id);
            }
        }

        for player_id in overflowed {
            self.players.remove(&player_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtmp::{RtmpPacketHeader, RTMP_TYPE_VIDEO};

    fn sample_packet() -> Arc<RtmpPacket> {
        Arc::new(RtmpPacket {
            header: RtmpPacketHeader {
                timestamp: 0,
                format: 0,
                channel_id: 0,
                packet_type: RTMP_TYPE_VIDEO,
                stream_id: 0,
                length: 4,
            },
            clock: 0,
            bytes: 0,
            handled: false,
            used: false,
            payload: vec![0x17, 0, 0, 0],
        })
    }

    fn add_player(channel: &mut RtmpChannelStatus, id: u64, queue_depth: usize) -> tokio::sync::mpsc::Receiver<RtmpSessionMessage> {
        let (sender, receiver) = tokio::sync::mpsc::channel(queue_depth);

        channel.players.insert(
            id,
            RtmpPlayerStatus {
                provided_key: String::new(),
                message_sender: sender,
                gop_clear: false,
                paused: false,
                idle: false,
                receive_audio: true,
                receive_video: true,
            },
        );

        receiver
    }

    #[tokio::test]
    async fn test_send_packet_is_noop_when_not_publishing() {
        let mut channel = RtmpChannelStatus::new();
        let _receiver = add_player(&mut channel, 1, 4);

        channel.send_packet(1, sample_packet(), false, 1024).await;

        assert_eq!(channel.players.len(), 1);
    }

    #[tokio::test]
    async fn test_send_packet_drops_subscriber_on_full_queue() {
        let mut channel = RtmpChannelStatus::new();
        channel.publishing = true;
        channel.publisher_id = Some(1);
        channel.publish_status = Some(Arc::new(Mutex::new(
            crate::session::RtmpSessionPublishStreamStatus::new(),
        )));

        // Queue of depth 1: the first packet fills it, the second overflows
        let mut receiver = add_player(&mut channel, 42, 1);

        channel.send_packet(1, sample_packet(), true, 1024).await;
        assert_eq!(channel.players.len(), 1);

        channel.send_packet(1, sample_packet(), true, 1024).await;
        assert!(!channel.players.contains_key(&42));

        // The message that did make it through before the drop is still in the queue
        assert!(receiver.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_send_packet_ignores_wrong_publisher() {
        let mut channel = RtmpChannelStatus::new();
        channel.publishing = true;
        channel.publisher_id = Some(1);
        channel.publish_status = Some(Arc::new(Mutex::new(
            crate::session::RtmpSessionPublishStreamStatus::new(),
        )));

        let mut receiver = add_player(&mut channel, 7, 8);

        // A stale publisher session (not the current one) should not reach players
        channel.send_packet(2, sample_packet(), true, 1024).await;

        assert!(receiver.try_recv().is_err());
    }
}
