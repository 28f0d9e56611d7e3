// Status of a published stream

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::rtmp::{RtmpPacket, RTMP_TYPE_VIDEO};

use super::RtmpSessionMessage;

/// Status of an RTMP published stream
pub struct RtmpSessionPublishStreamStatus {
    /// Clock value, used to compute relative timestamps for published packets
    pub clock: i64,

    /// Audio codec in use (sound format, from the first audio packet received)
    pub audio_codec: u32,

    /// Video codec in use (codec id, from the first video packet received)
    pub video_codec: u32,

    /// AAC sequence header (audio codec configuration)
    pub aac_sequence_header: Arc<Vec<u8>>,

    /// AVC sequence header (video codec configuration)
    pub avc_sequence_header: Arc<Vec<u8>>,

    /// Metadata (from @setDataFrame / onMetaData)
    pub metadata: Arc<Vec<u8>>,

    /// GOP cache: packets sent since the last video keyframe
    pub gop_cache: Vec<Arc<RtmpPacket>>,

    /// Current total size (bytes) of the GOP cache
    pub gop_cache_size: usize,
}

impl RtmpSessionPublishStreamStatus {
    /// Creates a new instance of RtmpSessionPublishStreamStatus
    pub fn new() -> RtmpSessionPublishStreamStatus {
        RtmpSessionPublishStreamStatus {
            clock: 0,
            audio_codec: 0,
            video_codec: 0,
            aac_sequence_header: Arc::new(Vec::new()),
            avc_sequence_header: Arc::new(Vec::new()),
            metadata: Arc::new(Vec::new()),
            gop_cache: Vec::new(),
            gop_cache_size: 0,
        }
    }

    /// Builds the message to send to a player that just started playing
    pub fn get_play_start_message(&self) -> RtmpSessionMessage {
        RtmpSessionMessage::PlayStart {
            metadata: self.metadata.clone(),
            audio_codec: self.audio_codec,
            aac_sequence_header: self.aac_sequence_header.clone(),
            video_codec: self.video_codec,
            avc_sequence_header: self.avc_sequence_header.clone(),
            gop_cache: self.gop_cache.clone(),
        }
    }

    /// Clears the GOP cache
    pub fn clear_gop(&mut self) {
        self.gop_cache.clear();
        self.gop_cache_size = 0;
    }

    /// Adds a packet to the GOP cache, if it fits within the configured cache size
    ///
    /// # Arguments
    ///
    /// * `publish_status` - The publish status
    /// * `packet` - The packet to add
    /// * `gop_cache_size` - Max size (bytes) of the GOP cache (server config)
    pub async fn push_new_packet(
        publish_status: &Mutex<RtmpSessionPublishStreamStatus>,
        packet: Arc<RtmpPacket>,
        gop_cache_size: usize,
    ) {
        if gop_cache_size == 0 {
            return;
        }

        let mut status = publish_status.lock().await;

        // A video keyframe starts a new GOP: previous packets are no longer needed
        if packet.header.packet_type == RTMP_TYPE_VIDEO
            && !packet.payload.is_empty()
            && (packet.payload[0] >> 4) & 0x0f == 1
        {
            status.gop_cache.clear();
            status.gop_cache_size = 0;
        }

        let packet_size = packet.payload.len();

        if status.gop_cache_size + packet_size > gop_cache_size {
            // Does not fit: drop the whole cache, since it is no longer a valid GOP
            status.gop_cache.clear();
            status.gop_cache_size = 0;
            return;
        }

        status.gop_cache_size += packet_size;
        status.gop_cache.push(packet);
    }

    /// Sets the metadata of the published stream
    ///
    /// # Arguments
    ///
    /// * `publish_status` - The publish status
    /// * `metadata` - The metadata bytes
    pub async fn set_metadata(
        publish_status: &Mutex<RtmpSessionPublishStreamStatus>,
        metadata: Arc<Vec<u8>>,
    ) {
        let mut status = publish_status.lock().await;
        status.metadata = metadata;
    }

    /// Builds the message to send to a player being resumed from pause
    ///
    /// # Arguments
    ///
    /// * `publish_status` - The publish status
    pub async fn get_player_resume_message(
        publish_status: &Mutex<RtmpSessionPublishStreamStatus>,
    ) -> RtmpSessionMessage {
        let status = publish_status.lock().await;

        RtmpSessionMessage::Resume {
            audio_codec: status.audio_codec,
            aac_sequence_header: status.aac_sequence_header.clone(),
            video_codec: status.video_codec,
            avc_sequence_header: status.avc_sequence_header.clone(),
        }
    }
}

impl Default for RtmpSessionPublishStreamStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtmp::{RtmpPacketHeader, RTMP_TYPE_AUDIO};

    fn video_packet(is_keyframe: bool, payload_len: usize) -> Arc<RtmpPacket> {
        let frame_type: u8 = if is_keyframe { 1 } else { 2 };
        let mut payload = vec![(frame_type << 4) | 0x07];
        payload.extend(vec![0u8; payload_len.saturating_sub(1)]);

        Arc::new(RtmpPacket {
            header: RtmpPacketHeader {
                timestamp: 0,
                format: 0,
                channel_id: 0,
                packet_type: RTMP_TYPE_VIDEO,
                stream_id: 0,
                length: payload.len(),
            },
            clock: 0,
            bytes: 0,
            handled: false,
            used: false,
            payload,
        })
    }

    fn audio_packet(payload_len: usize) -> Arc<RtmpPacket> {
        Arc::new(RtmpPacket {
            header: RtmpPacketHeader {
                timestamp: 0,
                format: 0,
                channel_id: 0,
                packet_type: RTMP_TYPE_AUDIO,
                stream_id: 0,
                length: payload_len,
            },
            clock: 0,
            bytes: 0,
            handled: false,
            used: false,
            payload: vec![0u8; payload_len],
        })
    }

    #[tokio::test]
    async fn test_gop_cache_disabled_when_size_is_zero() {
        let status = Mutex::new(RtmpSessionPublishStreamStatus::new());

        RtmpSessionPublishStreamStatus::push_new_packet(&status, video_packet(true, 10), 0).await;

        let locked = status.lock().await;
        assert!(locked.gop_cache.is_empty());
    }

    #[tokio::test]
    async fn test_keyframe_clears_previous_gop() {
        let status = Mutex::new(RtmpSessionPublishStreamStatus::new());

        RtmpSessionPublishStreamStatus::push_new_packet(&status, video_packet(true, 10), 1024).await;
        RtmpSessionPublishStreamStatus::push_new_packet(&status, audio_packet(5), 1024).await;
        RtmpSessionPublishStreamStatus::push_new_packet(&status, video_packet(false, 10), 1024).await;

        {
            let locked = status.lock().await;
            assert_eq!(locked.gop_cache.len(), 3);
        }

        // A new keyframe starts a fresh GOP, dropping everything before it
        RtmpSessionPublishStreamStatus::push_new_packet(&status, video_packet(true, 8), 1024).await;

        let locked = status.lock().await;
        assert_eq!(locked.gop_cache.len(), 1);
        assert_eq!(locked.gop_cache_size, 8);
    }

    #[tokio::test]
    async fn test_gop_cache_dropped_entirely_on_overflow() {
        let status = Mutex::new(RtmpSessionPublishStreamStatus::new());

        RtmpSessionPublishStreamStatus::push_new_packet(&status, video_packet(true, 10), 15).await;
        RtmpSessionPublishStreamStatus::push_new_packet(&status, audio_packet(10), 15).await;

        let locked = status.lock().await;
        assert!(locked.gop_cache.is_empty());
        assert_eq!(locked.gop_cache_size, 0);
    }
}
