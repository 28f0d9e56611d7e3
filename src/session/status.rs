// RTMP session status model

use std::io::Error;

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use crate::rtmp::rtmp_make_status_message;

use super::session_write_bytes;

/// Sends an `onStatus` command to the client
///
/// # Arguments
///
/// * `write_stream` - The stream to write to the client
/// * `stream_id` - ID of the RTMP stream the status refers to
/// * `level` - Status level (`"status"`, `"error"` or `"warning"`)
/// * `code` - Status code (e.g. `"NetStream.Publish.Start"`)
/// * `description` - Optional human readable description
/// * `out_chunk_size` - Chunk size to use to serialize the message
pub async fn send_status_message<TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin>(
    write_stream: &Mutex<TW>,
    stream_id: u32,
    level: &str,
    code: &str,
    description: Option<&str>,
    out_chunk_size: usize,
) -> Result<(), Error> {
    let status_bytes = rtmp_make_status_message(
        stream_id,
        level.to_string(),
        code.to_string(),
        description.map(|d| d.to_string()),
        out_chunk_size,
    );

    session_write_bytes(write_stream, &status_bytes).await
}

/// Play status of an RTMP session
#[derive(Clone)]
pub struct RtmpSessionPlayStatus {
    /// True if the session is currently playing a stream
    pub is_player: bool,

    /// ID of the internal RTMP stream used to play
    pub play_stream_id: u32,

    /// True to receive packets cached in the GOP cache when playback starts
    pub receive_gop: bool,

    /// True to receive audio packets
    pub receive_audio: bool,

    /// True to receive video packets
    pub receive_video: bool,
}

impl RtmpSessionPlayStatus {
    /// Creates a new instance of RtmpSessionPlayStatus
    pub fn new() -> RtmpSessionPlayStatus {
        RtmpSessionPlayStatus {
            is_player: false,
            play_stream_id: 0,
            receive_gop: true,
            receive_audio: true,
            receive_video: true,
        }
    }
}

impl Default for RtmpSessionPlayStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// RTMP session status
pub struct RtmpSessionStatus {
    /// Channel the session connected to (set by the connect command)
    pub channel: Option<String>,

    /// Stream key provided by the session (set when publishing)
    pub key: Option<String>,

    /// Timestamp (ms) of the connect command
    pub connect_time: i64,

    /// Number of streams created by the session, via createStream
    pub streams: u64,

    /// True if the session is publishing
    pub is_publisher: bool,

    /// ID of the internal RTMP stream used for publishing
    pub publish_stream_id: u32,

    /// Playing status
    pub play_status: RtmpSessionPlayStatus,

    /// True if the session has been killed and should be disconnected
    pub killed: bool,
}

impl RtmpSessionStatus {
    /// Creates a new instance of RtmpSessionStatus
    pub fn new() -> RtmpSessionStatus {
        RtmpSessionStatus {
            channel: None,
            key: None,
            connect_time: 0,
            streams: 0,
            is_publisher: false,
            publish_stream_id: 0,
            play_status: RtmpSessionPlayStatus::new(),
            killed: false,
        }
    }

    /// Gets the channel the session connected to
    pub async fn get_channel(status: &Mutex<RtmpSessionStatus>) -> Option<String> {
        let status_v = status.lock().await;
        status_v.channel.clone()
    }

    /// Checks if the session is a publisher (returns true if it is NOT already publishing)
    pub async fn check_is_publisher(status: &Mutex<RtmpSessionStatus>) -> bool {
        let status_v = status.lock().await;
        !status_v.is_publisher
    }

    /// Marks the session as a publisher
    pub async fn set_publisher(status: &Mutex<RtmpSessionStatus>, publish_stream_id: u32) {
        let mut status_v = status.lock().await;
        status_v.is_publisher = true;
        status_v.publish_stream_id = publish_stream_id;
    }

    /// Checks the play status of the session
    ///
    /// # Return value
    ///
    /// Returns a tuple with: is_player, play_stream_id, receive_gop, receive_audio, receive_video
    pub async fn check_play_status(
        status: &Mutex<RtmpSessionStatus>,
    ) -> (bool, u32, bool, bool, bool) {
        let status_v = status.lock().await;
        (
            status_v.play_status.is_player,
            status_v.play_status.play_stream_id,
            status_v.play_status.receive_gop,
            status_v.play_status.receive_audio,
            status_v.play_status.receive_video,
        )
    }

    /// Gets whether the session is a player, and the stream id it is playing
    pub async fn get_play_stream_id(status: &Mutex<RtmpSessionStatus>) -> (bool, u32) {
        let status_v = status.lock().await;
        (status_v.play_status.is_player, status_v.play_status.play_stream_id)
    }

    /// Stops playing
    pub async fn stop_playing(status: &Mutex<RtmpSessionStatus>) {
        let mut status_v = status.lock().await;
        status_v.play_status.is_player = false;
    }

    /// Marks the session as killed
    pub async fn set_killed(status: &Mutex<RtmpSessionStatus>) {
        let mut status_v = status.lock().await;
        status_v.killed = true;
    }
}

impl Default for RtmpSessionStatus {
    fn default() -> Self {
        Self::new()
    }
}
