// Error types for the RTMP endpoint

use thiserror::Error;

use crate::amf::AmfError;

/// Errors that can occur while decoding or handling an RTMP session
#[derive(Error, Debug)]
pub enum RtmpError {
    #[error("unsupported RTMP version: {0}")]
    UnsupportedVersion(u8),

    #[error("handshake mismatch")]
    HandshakeMismatch,

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("unknown AMF0 marker: {0:#x}")]
    AmfUnknownType(u8),

    #[error("truncated AMF data")]
    AmfTruncated,

    #[error("message too large: {size} bytes (limit {limit})")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("publisher already in use for channel '{0}'")]
    PublisherInUse(String),

    #[error("stream not found: '{0}'")]
    StreamNotFound(String),

    #[error("subscriber queue overflow for session {0}")]
    SubscriberOverflow(u64),

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AmfError> for RtmpError {
    fn from(err: AmfError) -> Self {
        match err {
            AmfError::Truncated => RtmpError::AmfTruncated,
            AmfError::UnknownType(marker) => RtmpError::AmfUnknownType(marker),
        }
    }
}
