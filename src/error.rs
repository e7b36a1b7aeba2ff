//! Error types for h2wire.

use thiserror::Error;

/// HTTP/2 error codes a validation failure maps to.
///
/// The connection never transmits these (no GOAWAY / RST_STREAM is sent);
/// they are attached to teardown diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    /// PROTOCOL_ERROR
    ProtocolError = 0x1,
    /// INTERNAL_ERROR
    InternalError = 0x2,
    /// FRAME_SIZE_ERROR
    FrameSizeError = 0x6,
}

/// Main error type for all h2wire operations.
#[derive(Debug, Error)]
pub enum H2Error {
    /// I/O error on the socket or while reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading a config file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Peer closed the socket, or the connection was already torn down.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A frame header could not be transferred in one notification.
    #[error("Incomplete frame header: {transferred} of 9 bytes")]
    IncompleteHeader { transferred: usize },

    /// The socket accepted zero bytes.
    #[error("Socket accepted zero bytes")]
    WriteZero,

    /// More bytes were accounted to a frame than its header declared.
    #[error("Frame buffer overflow: {transferred} bytes for a {length}-byte frame")]
    FrameOverflow { length: usize, transferred: usize },

    /// Frame payload size is invalid for its type.
    #[error("Frame size error: {0}")]
    FrameSize(String),

    /// Frame violates the protocol (wrong stream, wrong flags, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Payload larger than the negotiated or encodable maximum.
    #[error("Frame length {length} exceeds maximum {max}")]
    FrameTooLarge { length: usize, max: u32 },

    /// Stream identifier does not fit in 31 bits.
    #[error("Invalid stream id: {0:#x}")]
    InvalidStreamId(u32),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl H2Error {
    /// Error code the peer would be sent for this failure, if it is a
    /// protocol-level one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            H2Error::FrameSize(_) | H2Error::FrameTooLarge { .. } => Some(ErrorCode::FrameSizeError),
            H2Error::Protocol(_) => Some(ErrorCode::ProtocolError),
            H2Error::FrameOverflow { .. } => Some(ErrorCode::InternalError),
            _ => None,
        }
    }
}

/// Result type alias using H2Error.
pub type Result<T> = std::result::Result<T, H2Error>;
