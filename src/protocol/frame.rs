//! Frame struct with typed accessors and transfer bookkeeping.
//!
//! A frame is a [`Header`] plus an owned payload buffer of exactly
//! `header.length` bytes. While a frame crosses the socket it also records
//! how far the transfer got, so a partial read or write can resume on the
//! next readiness notification.
//!
//! # Example
//!
//! ```
//! use h2wire::protocol::Frame;
//!
//! let frame = Frame::new(0xFA, 0, 1, b"hello").unwrap();
//!
//! assert_eq!(frame.length(), 5);
//! assert_eq!(frame.payload(), b"hello");
//! assert_eq!(frame.transferred(), None);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{flags, Header, HEADER_SIZE, MAX_FRAME_LENGTH, MAX_STREAM_ID};
use crate::error::{H2Error, Result};

/// How much of a frame has crossed the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    /// Header not yet fully transferred (`n` of 9 bytes done).
    Header(usize),
    /// Header done, `n` payload bytes transferred.
    Payload(usize),
}

/// A protocol frame.
#[derive(Debug)]
pub struct Frame {
    header: Header,
    payload: BytesMut,
    pub(crate) progress: Progress,
}

impl Frame {
    /// Create an outbound frame, copying `payload`.
    ///
    /// Fails if the payload does not fit the 24-bit length field or the
    /// stream id does not fit in 31 bits.
    pub fn new(frame_type: u8, flags: u8, stream_id: u32, payload: &[u8]) -> Result<Self> {
        Self::with_payload(frame_type, flags, stream_id, BytesMut::from(payload))
    }

    /// Create an outbound frame that takes ownership of `payload`.
    pub fn with_payload(
        frame_type: u8,
        flags: u8,
        stream_id: u32,
        payload: BytesMut,
    ) -> Result<Self> {
        if payload.len() > MAX_FRAME_LENGTH as usize {
            return Err(H2Error::FrameTooLarge {
                length: payload.len(),
                max: MAX_FRAME_LENGTH,
            });
        }
        if stream_id > MAX_STREAM_ID {
            return Err(H2Error::InvalidStreamId(stream_id));
        }
        let header = Header::new(payload.len() as u32, frame_type, flags, stream_id);
        Ok(Self {
            header,
            payload,
            progress: Progress::Header(0),
        })
    }

    /// Create an empty connection-level (stream 0) frame.
    pub(crate) fn empty(frame_type: u8, flags: u8) -> Self {
        Self {
            header: Header::new(0, frame_type, flags, 0),
            payload: BytesMut::new(),
            progress: Progress::Header(0),
        }
    }

    /// Create an inbound frame for a decoded header.
    ///
    /// The payload buffer is allocated to `header.length` bytes and the
    /// header counts as already received.
    pub(crate) fn from_header(header: Header) -> Self {
        Self {
            header,
            payload: BytesMut::zeroed(header.length as usize),
            progress: Progress::Payload(0),
        }
    }

    /// Get the decoded header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the frame type code.
    #[inline]
    pub fn frame_type(&self) -> u8 {
        self.header.frame_type
    }

    /// Get the flags byte.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.header.flags
    }

    /// Get the stream ID.
    #[inline]
    pub fn stream_id(&self) -> u32 {
        self.header.stream_id
    }

    /// Get the declared payload length.
    #[inline]
    pub fn length(&self) -> usize {
        self.header.length as usize
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame, returning its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload.freeze()
    }

    /// Check if the ACK flag is set.
    #[inline]
    pub fn is_ack(&self) -> bool {
        flags::has_flag(self.header.flags, flags::ACK)
    }

    /// Payload bytes transferred so far, or `None` while the header is
    /// still pending.
    pub fn transferred(&self) -> Option<usize> {
        match self.progress {
            Progress::Header(_) => None,
            Progress::Payload(n) => Some(n),
        }
    }

    /// Check if header and payload have been fully transferred.
    pub fn is_complete(&self) -> bool {
        self.progress == Progress::Payload(self.length())
    }

    /// Untransferred header bytes, encoded on demand.
    pub(crate) fn pending_header(&self) -> Option<([u8; HEADER_SIZE], usize)> {
        match self.progress {
            Progress::Header(done) => Some((self.header.encode(), done)),
            Progress::Payload(_) => None,
        }
    }

    /// Untransferred payload bytes (outbound side).
    pub(crate) fn pending_payload(&self) -> &[u8] {
        match self.progress {
            Progress::Header(_) => &self.payload[..],
            Progress::Payload(done) => &self.payload[done.min(self.payload.len())..],
        }
    }

    /// Unfilled payload space (inbound side).
    pub(crate) fn unfilled_payload(&mut self) -> &mut [u8] {
        match self.progress {
            Progress::Header(_) => &mut [],
            Progress::Payload(done) => {
                let start = done.min(self.payload.len());
                &mut self.payload[start..]
            }
        }
    }

    /// Account `n` transferred header bytes.
    pub(crate) fn advance_header(&mut self, n: usize) {
        if let Progress::Header(done) = self.progress {
            let done = done + n;
            self.progress = if done >= HEADER_SIZE {
                Progress::Payload(0)
            } else {
                Progress::Header(done)
            };
        }
    }

    /// Account `n` transferred payload bytes.
    ///
    /// Returns an integrity error if the total would exceed the declared
    /// length.
    pub(crate) fn advance_payload(&mut self, n: usize) -> Result<()> {
        let done = match self.progress {
            Progress::Payload(done) => done + n,
            Progress::Header(_) => n,
        };
        if done > self.length() {
            return Err(H2Error::FrameOverflow {
                length: self.length(),
                transferred: done,
            });
        }
        self.progress = Progress::Payload(done);
        Ok(())
    }
}
