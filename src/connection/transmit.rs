//! Transmit queue and writer.
//!
//! Outbound frames wait in strict FIFO order. Only the head frame is ever
//! written; frames behind it are untouched until it has fully left.

use std::collections::VecDeque;

use super::recv::is_not_ready;
use crate::error::{H2Error, Result};
use crate::protocol::{Frame, HEADER_SIZE};
use crate::reactor::Socket;

/// Result of one write step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    /// Nothing queued.
    Idle,
    /// Head frame partly written or the socket was not ready.
    Pending,
    /// Head frame fully written; `remaining` frames are still queued.
    Sent { remaining: usize },
}

/// FIFO of outbound frames.
#[derive(Debug, Default)]
pub(crate) struct TxQueue {
    frames: VecDeque<Frame>,
}

impl TxQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a frame. Returns `true` if the queue was empty.
    pub(crate) fn push(&mut self, frame: Frame) -> bool {
        let was_empty = self.frames.is_empty();
        self.frames.push_back(frame);
        was_empty
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every queued frame unsent. Returns how many were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.frames.len();
        self.frames.clear();
        dropped
    }

    /// Write as much of the head frame as the socket accepts.
    pub(crate) fn write_to<S: Socket>(
        &mut self,
        socket: &S,
        strict_header: bool,
    ) -> Result<WriteOutcome> {
        let Some(frame) = self.frames.front_mut() else {
            return Ok(WriteOutcome::Idle);
        };

        if let Some((header, done)) = frame.pending_header() {
            let Some(n) = write_some(socket, &header[done..])? else {
                return Ok(WriteOutcome::Pending);
            };
            frame.advance_header(n);

            let written = done + n;
            if written < HEADER_SIZE {
                if strict_header {
                    return Err(H2Error::IncompleteHeader {
                        transferred: written,
                    });
                }
                return Ok(WriteOutcome::Pending);
            }
        }

        if !frame.pending_payload().is_empty() {
            let Some(n) = write_some(socket, frame.pending_payload())? else {
                return Ok(WriteOutcome::Pending);
            };
            frame.advance_payload(n)?;
        }

        if !frame.is_complete() {
            return Ok(WriteOutcome::Pending);
        }

        if let Some(frame) = self.frames.pop_front() {
            tracing::debug!(
                "TX frame: len={} type={:#04x} flags={:#04x} stream={}",
                frame.length(),
                frame.frame_type(),
                frame.flags(),
                frame.stream_id()
            );
        }
        Ok(WriteOutcome::Sent {
            remaining: self.frames.len(),
        })
    }
}

/// One non-blocking write. `None` means the socket was not ready.
fn write_some<S: Socket>(socket: &S, buf: &[u8]) -> Result<Option<usize>> {
    match socket.try_write(buf) {
        Ok(0) => Err(H2Error::WriteZero),
        Ok(n) => Ok(Some(n)),
        Err(e) if is_not_ready(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::io;

    use super::*;
    use crate::protocol::{flags, frame_type, Header};

    /// Socket accepting at most `cap` bytes per write.
    struct Sink {
        written: RefCell<Vec<u8>>,
        cap: usize,
        blocked: Cell<bool>,
    }

    impl Sink {
        fn new(cap: usize) -> Self {
            Self {
                written: RefCell::new(Vec::new()),
                cap,
                blocked: Cell::new(false),
            }
        }
    }

    impl Socket for Sink {
        fn try_read(&self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }

        fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
            if self.blocked.get() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.cap);
            self.written.borrow_mut().extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    fn wire(frame_type: u8, stream_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Header::new(payload.len() as u32, frame_type, 0, stream_id)
            .encode()
            .to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_push_reports_empty_queue() {
        let mut queue = TxQueue::new();
        assert!(queue.push(Frame::settings_ack()));
        assert!(!queue.push(Frame::settings_ack()));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_queue_is_idle() {
        let mut queue = TxQueue::new();
        let sink = Sink::new(usize::MAX);
        assert_eq!(queue.write_to(&sink, false).unwrap(), WriteOutcome::Idle);
    }

    #[test]
    fn test_one_frame_per_step() {
        let mut queue = TxQueue::new();
        queue.push(Frame::new(0x00, 0, 1, b"one").unwrap());
        queue.push(Frame::new(0x00, 0, 3, b"two").unwrap());
        let sink = Sink::new(usize::MAX);

        assert_eq!(
            queue.write_to(&sink, false).unwrap(),
            WriteOutcome::Sent { remaining: 1 }
        );
        assert_eq!(*sink.written.borrow(), wire(0x00, 1, b"one"));
        assert_eq!(
            queue.write_to(&sink, false).unwrap(),
            WriteOutcome::Sent { remaining: 0 }
        );
        assert_eq!(queue.write_to(&sink, false).unwrap(), WriteOutcome::Idle);
    }

    #[test]
    fn test_fifo_order_with_single_byte_writes() {
        let mut queue = TxQueue::new();
        queue.push(Frame::new(0x00, 0, 1, b"first").unwrap());
        queue.push(Frame::new(0x08, 0, 3, b"second").unwrap());
        queue.push(Frame::new(0xFA, 0, 5, b"").unwrap());
        let sink = Sink::new(1);

        let mut steps = 0;
        loop {
            match queue.write_to(&sink, false).unwrap() {
                WriteOutcome::Idle => break,
                WriteOutcome::Pending | WriteOutcome::Sent { .. } => steps += 1,
            }
            assert!(steps < 1000);
        }

        let mut expected = wire(0x00, 1, b"first");
        expected.extend(wire(0x08, 3, b"second"));
        expected.extend(wire(0xFA, 5, b""));
        assert_eq!(*sink.written.borrow(), expected);
    }

    #[test]
    fn test_zero_length_frame_sent_with_header() {
        let mut queue = TxQueue::new();
        queue.push(Frame::settings_ack());
        let sink = Sink::new(usize::MAX);

        assert_eq!(
            queue.write_to(&sink, false).unwrap(),
            WriteOutcome::Sent { remaining: 0 }
        );
        let written = sink.written.borrow();
        let header = Header::decode(&written).unwrap();
        assert_eq!(header.frame_type, frame_type::SETTINGS);
        assert_eq!(header.flags, flags::ACK);
        assert_eq!(written.len(), HEADER_SIZE);
    }

    #[test]
    fn test_would_block_is_pending() {
        let mut queue = TxQueue::new();
        queue.push(Frame::new(0x00, 0, 1, b"data").unwrap());
        let sink = Sink::new(usize::MAX);
        sink.blocked.set(true);

        assert_eq!(queue.write_to(&sink, false).unwrap(), WriteOutcome::Pending);
        assert!(sink.written.borrow().is_empty());

        sink.blocked.set(false);
        assert_eq!(
            queue.write_to(&sink, false).unwrap(),
            WriteOutcome::Sent { remaining: 0 }
        );
    }

    #[test]
    fn test_short_header_write_fatal_when_strict() {
        let mut queue = TxQueue::new();
        queue.push(Frame::settings_ack());
        let sink = Sink::new(4);

        let err = queue.write_to(&sink, true).unwrap_err();
        assert!(matches!(err, H2Error::IncompleteHeader { transferred: 4 }));
    }

    #[test]
    fn test_write_zero_is_error() {
        let mut queue = TxQueue::new();
        queue.push(Frame::settings_ack());
        let sink = Sink::new(0);

        assert!(matches!(
            queue.write_to(&sink, false),
            Err(H2Error::WriteZero)
        ));
    }
}
