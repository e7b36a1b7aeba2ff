//! Receive state machine.
//!
//! ```text
//!             header complete                 payload complete
//! AwaitingHeader ─────────────► AwaitingPayload ───────────────► AwaitingHeader
//!      ▲  │ short read              │  ▲ partial payload              (frame out)
//!      └──┘ (buffered)              └──┘
//! ```
//!
//! Every call performs at most one read for the header and one for the
//! payload. `WouldBlock` leaves the state untouched; the caller re-arms
//! read readiness and tries again on the next notification.

use std::io;

use crate::error::{H2Error, Result};
use crate::protocol::{Frame, Header, HEADER_SIZE};
use crate::reactor::Socket;

enum RecvState {
    AwaitingHeader {
        buf: [u8; HEADER_SIZE],
        filled: usize,
    },
    AwaitingPayload(Frame),
}

impl RecvState {
    fn header() -> Self {
        RecvState::AwaitingHeader {
            buf: [0u8; HEADER_SIZE],
            filled: 0,
        }
    }
}

/// Inbound side of a connection.
pub(crate) struct Receiver {
    state: RecvState,
    max_frame_size: u32,
    strict_header: bool,
}

impl Receiver {
    pub(crate) fn new(max_frame_size: u32, strict_header: bool) -> Self {
        Self {
            state: RecvState::header(),
            max_frame_size,
            strict_header,
        }
    }

    /// Advance with whatever the socket has available.
    ///
    /// Returns the completed frame, if this step finished one.
    pub(crate) fn read_from<S: Socket>(&mut self, socket: &S) -> Result<Option<Frame>> {
        if let RecvState::AwaitingHeader { buf, filled } = &mut self.state {
            let Some(n) = read_some(socket, &mut buf[*filled..])? else {
                return Ok(None);
            };
            *filled += n;

            if *filled < HEADER_SIZE {
                if self.strict_header {
                    return Err(H2Error::IncompleteHeader {
                        transferred: *filled,
                    });
                }
                tracing::trace!("Partial header: {} of {} bytes", filled, HEADER_SIZE);
                return Ok(None);
            }

            let header = Header::decode(&buf[..]).ok_or(H2Error::IncompleteHeader {
                transferred: *filled,
            })?;
            if header.length > self.max_frame_size {
                return Err(H2Error::FrameTooLarge {
                    length: header.length as usize,
                    max: self.max_frame_size,
                });
            }
            self.state = RecvState::AwaitingPayload(Frame::from_header(header));
        }

        let RecvState::AwaitingPayload(frame) = &mut self.state else {
            return Ok(None);
        };

        if !frame.is_complete() {
            let Some(n) = read_some(socket, frame.unfilled_payload())? else {
                return Ok(None);
            };
            frame.advance_payload(n)?;
            if !frame.is_complete() {
                return Ok(None);
            }
        }

        match std::mem::replace(&mut self.state, RecvState::header()) {
            RecvState::AwaitingPayload(frame) => Ok(Some(frame)),
            RecvState::AwaitingHeader { .. } => Ok(None),
        }
    }

    /// Frame whose payload is being received, if any.
    pub(crate) fn in_progress(&self) -> Option<&Frame> {
        match &self.state {
            RecvState::AwaitingPayload(frame) => Some(frame),
            RecvState::AwaitingHeader { .. } => None,
        }
    }

    /// Drop any partial frame and expect a fresh header.
    pub(crate) fn reset(&mut self) {
        self.state = RecvState::header();
    }
}

/// One non-blocking read. `None` means the socket was not ready.
fn read_some<S: Socket>(socket: &S, buf: &mut [u8]) -> Result<Option<usize>> {
    match socket.try_read(buf) {
        Ok(0) => Err(H2Error::ConnectionClosed),
        Ok(n) => Ok(Some(n)),
        Err(e) if is_not_ready(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn is_not_ready(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
