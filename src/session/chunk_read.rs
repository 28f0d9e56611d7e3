// Chunk stream reassembly

use std::{collections::HashMap, sync::Arc};

use byteorder::{BigEndian, ByteOrder};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use crate::{
    error::RtmpError,
    rtmp::{
        rtmp_make_ack, RtmpPacket, RTMP_CHUNK_SIZE_DEFAULT, RTMP_CHUNK_TYPE_0, RTMP_CHUNK_TYPE_1,
        RTMP_CHUNK_TYPE_2,
    },
    server::RtmpChannelStatus,
};

use super::write::session_write_bytes;

/// Per-session state for reading and reassembling the incoming chunk stream
///
/// This state is local to the session read loop and is never shared across tasks
pub struct RtmpSessionReadStatus {
    /// Channel the session is currently publishing to, if any
    pub channel_status: Option<Arc<Mutex<RtmpChannelStatus>>>,

    /// Chunk size announced by the client (Set Chunk Size protocol message)
    pub in_chunk_size: usize,

    /// Per chunk stream ID assembly state
    chunks: HashMap<u32, RtmpPacket>,

    /// Total bytes received so far (used for the acknowledgement window)
    bytes_received: u64,

    /// Value of `bytes_received` the last time an Acknowledgement was sent
    last_ack_sent: u64,
}

impl RtmpSessionReadStatus {
    /// Creates a new instance of RtmpSessionReadStatus
    pub fn new() -> RtmpSessionReadStatus {
        RtmpSessionReadStatus {
            channel_status: None,
            in_chunk_size: RTMP_CHUNK_SIZE_DEFAULT as usize,
            chunks: HashMap::new(),
            bytes_received: 0,
            last_ack_sent: 0,
        }
    }

    /// Discards the assembly state kept for a chunk stream ID (used by the Abort Message)
    pub fn discard_chunk_stream(&mut self, csid: u32) {
        self.chunks.remove(&csid);
    }
}

impl Default for RtmpSessionReadStatus {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_u8<TR: AsyncRead + AsyncReadExt + Unpin>(read_stream: &mut TR) -> Result<u8, RtmpError> {
    let mut b = [0u8; 1];
    read_stream.read_exact(&mut b).await?;
    Ok(b[0])
}

/// Reads the basic header (chunk stream ID + format) of the next chunk
async fn read_basic_header<TR: AsyncRead + AsyncReadExt + Unpin>(
    read_stream: &mut TR,
) -> Result<(u32, u32), RtmpError> {
    let first = read_u8(read_stream).await?;

    let format = ((first >> 6) & 0x03) as u32;
    let csid_low = first & 0x3f;

    let csid: u32 = match csid_low {
        0 => {
            let b0 = read_u8(read_stream).await?;
            64 + b0 as u32
        }
        1 => {
            let b0 = read_u8(read_stream).await?;
            let b1 = read_u8(read_stream).await?;
            64 + b0 as u32 + (b1 as u32) * 256
        }
        n => n as u32,
    };

    Ok((format, csid))
}

/// Reads a 3-byte big endian integer
async fn read_u24<TR: AsyncRead + AsyncReadExt + Unpin>(read_stream: &mut TR) -> Result<u32, RtmpError> {
    let mut b = [0u8; 4];
    read_stream.read_exact(&mut b[1..]).await?;
    Ok(BigEndian::read_u32(&b))
}

/// Reads a 4-byte big endian integer
async fn read_u32<TR: AsyncRead + AsyncReadExt + Unpin>(read_stream: &mut TR) -> Result<u32, RtmpError> {
    let mut b = [0u8; 4];
    read_stream.read_exact(&mut b).await?;
    Ok(BigEndian::read_u32(&b))
}

/// Reads one chunk from the stream and folds it into the chunk stream's partial message
///
/// # Arguments
///
/// * `read_stream` - The stream to read from the client
/// * `write_stream` - The stream to write to the client (used to send back Acknowledgements)
/// * `read_status` - The session's chunk read state
/// * `window_ack_size` - Window size (bytes) configured for Acknowledgement messages
/// * `max_message_size` - Maximum allowed size of a reassembled message
///
/// # Return value
///
/// Returns `Ok(Some(packet))` when a chunk completed a full message, `Ok(None)` if more
/// chunks are needed, or `Err` on a protocol violation or I/O error
pub async fn read_rtmp_chunk<
    TR: AsyncRead + AsyncReadExt + Unpin,
    TW: AsyncWrite + AsyncWriteExt + Send + Sync + Unpin,
>(
    read_stream: &mut TR,
    write_stream: &Mutex<TW>,
    read_status: &mut RtmpSessionReadStatus,
    window_ack_size: u32,
    max_message_size: usize,
) -> Result<Option<RtmpPacket>, RtmpError> {
    let (format, csid) = read_basic_header(read_stream).await?;

    let mut header_bytes: u64 = if csid >= 64 + 255 {
        3
    } else if csid >= 64 {
        2
    } else {
        1
    };

    let entry = read_status
        .chunks
        .entry(csid)
        .or_insert_with(RtmpPacket::new_blank);

    match format {
        RTMP_CHUNK_TYPE_0 => {
            let base_timestamp = read_u24(read_stream).await?;
            let length = read_u24(read_stream).await? as usize;
            let packet_type = read_u8(read_stream).await? as u32;
            let mut stream_id_bytes = [0u8; 4];
            read_stream.read_exact(&mut stream_id_bytes).await?;
            let stream_id = u32::from_le_bytes(stream_id_bytes);

            header_bytes += 11;

            let extended = base_timestamp == 0xffffff;
            let resolved_timestamp = if extended {
                header_bytes += 4;
                read_u32(read_stream).await?
            } else {
                base_timestamp
            };

            entry.header.format = format;
            entry.header.channel_id = csid;
            entry.header.packet_type = packet_type;
            entry.header.stream_id = stream_id;
            entry.header.length = length;
            entry.header.timestamp = resolved_timestamp as i64;
            entry.clock = resolved_timestamp as i64;
            entry.used = extended;
            entry.bytes = 0;
            entry.payload = Vec::with_capacity(length.min(max_message_size));
            entry.handled = false;
        }
        RTMP_CHUNK_TYPE_1 => {
            let delta = read_u24(read_stream).await?;
            let length = read_u24(read_stream).await? as usize;
            let packet_type = read_u8(read_stream).await? as u32;

            header_bytes += 7;

            let extended = delta == 0xffffff;
            let resolved_delta = if extended {
                header_bytes += 4;
                read_u32(read_stream).await?
            } else {
                delta
            };

            entry.header.format = format;
            entry.header.channel_id = csid;
            entry.header.packet_type = packet_type;
            entry.header.length = length;
            entry.clock = entry.clock.wrapping_add(resolved_delta as i64);
            entry.header.timestamp = entry.clock;
            entry.used = extended;
            entry.bytes = 0;
            entry.payload = Vec::with_capacity(length.min(max_message_size));
            entry.handled = false;
        }
        RTMP_CHUNK_TYPE_2 => {
            let delta = read_u24(read_stream).await?;

            header_bytes += 3;

            let extended = delta == 0xffffff;
            let resolved_delta = if extended {
                header_bytes += 4;
                read_u32(read_stream).await?
            } else {
                delta
            };

            entry.header.format = format;
            entry.clock = entry.clock.wrapping_add(resolved_delta as i64);
            entry.header.timestamp = entry.clock;
            entry.used = extended;
            entry.bytes = 0;
            entry.payload = Vec::with_capacity(entry.header.length.min(max_message_size));
            entry.handled = false;
        }
        _ => {
            // Type 3: no message header, fully inherited from the previous chunk on this csid
            if entry.used {
                // The previous chunk on this csid used extended timestamps, so every
                // continuation (including type 3) repeats the 4-byte field
                header_bytes += 4;
                let _ = read_u32(read_stream).await?;
            }

            if entry.bytes == 0 && entry.header.length > 0 {
                entry.header.format = format;
                entry.payload = Vec::with_capacity(entry.header.length.min(max_message_size));
            }
        }
    }

    if entry.header.length > max_message_size {
        return Err(RtmpError::MessageTooLarge {
            size: entry.header.length,
            limit: max_message_size,
        });
    }

    let remaining = entry.header.length - entry.bytes;
    let to_read = remaining.min(read_status.in_chunk_size);

    let mut payload_bytes: u64 = 0;

    if to_read > 0 {
        let mut buf = vec![0u8; to_read];
        read_stream.read_exact(&mut buf).await?;
        entry.payload.extend_from_slice(&buf);
        entry.bytes += to_read;
        payload_bytes = to_read as u64;
    }

    read_status.bytes_received = read_status
        .bytes_received
        .wrapping_add(header_bytes)
        .wrapping_add(payload_bytes);

    if window_ack_size > 0
        && read_status.bytes_received.wrapping_sub(read_status.last_ack_sent)
            >= window_ack_size as u64
    {
        let ack_bytes = rtmp_make_ack(read_status.bytes_received as u32);
        session_write_bytes(write_stream, &ack_bytes).await?;
        read_status.last_ack_sent = read_status.bytes_received;
    }

    if entry.bytes >= entry.header.length {
        let completed = RtmpPacket {
            header: entry.header.clone(),
            clock: entry.clock,
            bytes: entry.bytes,
            handled: false,
            used: entry.used,
            payload: entry.payload.clone(),
        };

        entry.payload = Vec::new();
        entry.bytes = 0;

        Ok(Some(completed))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtmp::{RTMP_CHANNEL_AUDIO, RTMP_TYPE_AUDIO};

    async fn read_one(
        encoded: &[u8],
        read_status: &mut RtmpSessionReadStatus,
        window_ack_size: u32,
    ) -> Result<Option<RtmpPacket>, RtmpError> {
        let write_stream = Mutex::new(Vec::new());
        let mut cursor: &[u8] = encoded;
        read_rtmp_chunk(&mut cursor, &write_stream, read_status, window_ack_size, 1024 * 1024).await
    }

    #[tokio::test]
    async fn test_single_fmt0_chunk_in_one_pass() {
        let mut packet = RtmpPacket::new_blank();
        packet.header.format = RTMP_CHUNK_TYPE_0;
        packet.header.channel_id = RTMP_CHANNEL_AUDIO;
        packet.header.packet_type = RTMP_TYPE_AUDIO;
        packet.header.stream_id = 1;
        packet.header.timestamp = 100;
        packet.payload = vec![1, 2, 3, 4];
        packet.header.length = packet.payload.len();

        let encoded = packet.create_chunks(4096);

        let mut read_status = RtmpSessionReadStatus::new();
        let result = read_one(&encoded, &mut read_status, 0).await.unwrap();

        let completed = result.expect("message should complete in a single chunk");
        assert_eq!(completed.payload, vec![1, 2, 3, 4]);
        assert_eq!(completed.header.timestamp, 100);
        assert_eq!(completed.header.packet_type, RTMP_TYPE_AUDIO);
    }

    #[tokio::test]
    async fn test_fmt0_split_across_small_chunk_size() {
        let mut packet = RtmpPacket::new_blank();
        packet.header.format = RTMP_CHUNK_TYPE_0;
        packet.header.channel_id = RTMP_CHANNEL_AUDIO;
        packet.header.packet_type = RTMP_TYPE_AUDIO;
        packet.header.stream_id = 1;
        packet.header.timestamp = 5;
        packet.payload = vec![9; 10];
        packet.header.length = packet.payload.len();

        // Encode with a chunk size of 4, so the message spans 3 chunks (4 + 4 + 2)
        let encoded = packet.create_chunks(4);

        let mut read_status = RtmpSessionReadStatus::new();
        read_status.in_chunk_size = 4;

        let mut cursor: &[u8] = &encoded;
        let write_stream = Mutex::new(Vec::new());

        let first = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 1024).await.unwrap();
        assert!(first.is_none());

        let second = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 1024).await.unwrap();
        assert!(second.is_none());

        let third = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 1024).await.unwrap();
        let completed = third.expect("message should complete on the third chunk");
        assert_eq!(completed.payload, vec![9; 10]);
    }

    #[tokio::test]
    async fn test_extended_timestamp_roundtrip() {
        let mut packet = RtmpPacket::new_blank();
        packet.header.format = RTMP_CHUNK_TYPE_0;
        packet.header.channel_id = RTMP_CHANNEL_AUDIO;
        packet.header.packet_type = RTMP_TYPE_AUDIO;
        packet.header.stream_id = 1;
        packet.header.timestamp = 0x01000000; // beyond the 3-byte sentinel threshold
        packet.payload = vec![7, 7];
        packet.header.length = packet.payload.len();

        let encoded = packet.create_chunks(4096);

        let mut read_status = RtmpSessionReadStatus::new();
        let completed = read_one(&encoded, &mut read_status, 0)
            .await
            .unwrap()
            .expect("message should complete");

        assert_eq!(completed.header.timestamp, 0x01000000);
    }

    #[tokio::test]
    async fn test_message_too_large_is_rejected() {
        let mut packet = RtmpPacket::new_blank();
        packet.header.format = RTMP_CHUNK_TYPE_0;
        packet.header.channel_id = RTMP_CHANNEL_AUDIO;
        packet.header.packet_type = RTMP_TYPE_AUDIO;
        packet.header.stream_id = 1;
        packet.payload = vec![0; 64];
        packet.header.length = packet.payload.len();

        let encoded = packet.create_chunks(4096);

        let mut read_status = RtmpSessionReadStatus::new();
        let write_stream = Mutex::new(Vec::new());
        let mut cursor: &[u8] = &encoded;

        let result = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 16).await;
        assert!(matches!(result, Err(RtmpError::MessageTooLarge { size: 64, limit: 16 })));
    }

    #[tokio::test]
    async fn test_ack_emitted_once_window_threshold_reached() {
        let mut packet = RtmpPacket::new_blank();
        packet.header.format = RTMP_CHUNK_TYPE_0;
        packet.header.channel_id = RTMP_CHANNEL_AUDIO;
        packet.header.packet_type = RTMP_TYPE_AUDIO;
        packet.header.stream_id = 1;
        packet.payload = vec![1, 2, 3, 4, 5];
        packet.header.length = packet.payload.len();

        let encoded = packet.create_chunks(4096);

        let mut read_status = RtmpSessionReadStatus::new();
        let write_stream = Mutex::new(Vec::new());
        let mut cursor: &[u8] = &encoded;

        // Window smaller than the chunk, so an Acknowledgement must be flushed back
        read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 1, 1024)
            .await
            .unwrap();

        let written = write_stream.lock().await;
        assert!(!written.is_empty());
        assert_eq!(read_status.last_ack_sent, read_status.bytes_received);
    }

    #[tokio::test]
    async fn test_type3_inherits_previous_chunk_header() {
        // First chunk establishes the message via fmt0, second and third messages on the
        // same csid reuse fmt3 chunks with no header besides the basic header.
        let mut header_template = RtmpPacket::new_blank();
        header_template.header.channel_id = RTMP_CHANNEL_AUDIO;
        header_template.header.packet_type = RTMP_TYPE_AUDIO;
        header_template.header.stream_id = 1;

        let mut first = header_template.clone();
        first.header.format = RTMP_CHUNK_TYPE_0;
        first.header.timestamp = 10;
        first.payload = vec![1, 1];
        first.header.length = first.payload.len();

        let mut encoded = first.create_chunks(4096);

        // Manually append a fmt3 chunk (basic header only) reusing the same csid,
        // carrying a payload of the same declared length.
        let basic_header_fmt3 =
            crate::rtmp::RtmpPacket::serialize_basic_header(RTMP_CHUNK_TYPE_3, RTMP_CHANNEL_AUDIO);
        encoded.extend(basic_header_fmt3);
        encoded.extend(vec![2, 2]);

        let mut read_status = RtmpSessionReadStatus::new();
        let write_stream = Mutex::new(Vec::new());
        let mut cursor: &[u8] = &encoded;

        let first_result = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 1024)
            .await
            .unwrap()
            .expect("first message should complete");
        assert_eq!(first_result.payload, vec![1, 1]);

        let second_result = read_rtmp_chunk(&mut cursor, &write_stream, &mut read_status, 0, 1024)
            .await
            .unwrap()
            .expect("second message should complete, inheriting the previous header");
        assert_eq!(second_result.payload, vec![2, 2]);
        assert_eq!(second_result.header.timestamp, 10);
    }
}
