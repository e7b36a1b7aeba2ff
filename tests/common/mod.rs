//! In-memory socket pair and notification helpers shared by the
//! integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use h2wire::handler::{FrameContext, FrameHandler, HandlerResult};
use h2wire::reactor::{EventLoop, Interest, Registration, Socket};
use h2wire::{Connection, Frame, Header};

pub type MemConnection = Connection<MemorySocket, EventLoop>;

#[derive(Default)]
struct Wire {
    bytes: RefCell<VecDeque<u8>>,
    closed: Cell<bool>,
}

/// One end of an in-memory byte stream.
///
/// Clones share the same end, so a test can keep a handle to a socket
/// owned by a connection.
#[derive(Clone)]
pub struct MemorySocket {
    inbound: Rc<Wire>,
    outbound: Rc<Wire>,
    read_cap: Rc<Cell<usize>>,
    write_cap: Rc<Cell<usize>>,
}

/// Create two connected ends.
pub fn pair() -> (MemorySocket, MemorySocket) {
    let a_to_b = Rc::new(Wire::default());
    let b_to_a = Rc::new(Wire::default());
    let a = MemorySocket {
        inbound: Rc::clone(&b_to_a),
        outbound: Rc::clone(&a_to_b),
        read_cap: Rc::new(Cell::new(usize::MAX)),
        write_cap: Rc::new(Cell::new(usize::MAX)),
    };
    let b = MemorySocket {
        inbound: a_to_b,
        outbound: b_to_a,
        read_cap: Rc::new(Cell::new(usize::MAX)),
        write_cap: Rc::new(Cell::new(usize::MAX)),
    };
    (a, b)
}

impl MemorySocket {
    /// Write bytes to the other end, ignoring the write cap.
    pub fn push(&self, bytes: &[u8]) {
        self.outbound.bytes.borrow_mut().extend(bytes.iter().copied());
    }

    /// Take everything the other end has written so far.
    pub fn drain(&self) -> Vec<u8> {
        self.inbound.bytes.borrow_mut().drain(..).collect()
    }

    /// Signal EOF to the other end.
    pub fn shutdown(&self) {
        self.outbound.closed.set(true);
    }

    /// Largest number of bytes a single read returns.
    pub fn set_read_cap(&self, cap: usize) {
        self.read_cap.set(cap);
    }

    /// Largest number of bytes a single write accepts. Zero means the
    /// socket is never writable.
    pub fn set_write_cap(&self, cap: usize) {
        self.write_cap.set(cap);
    }

    /// Check if a read would not block.
    pub fn is_readable(&self) -> bool {
        !self.inbound.bytes.borrow().is_empty() || self.inbound.closed.get()
    }

    pub fn pending(&self) -> usize {
        self.inbound.bytes.borrow().len()
    }
}

impl Socket for MemorySocket {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut bytes = self.inbound.bytes.borrow_mut();
        if bytes.is_empty() {
            return if self.inbound.closed.get() {
                Ok(0)
            } else {
                Err(io::ErrorKind::WouldBlock.into())
            };
        }
        let n = bytes.len().min(buf.len()).min(self.read_cap.get());
        for (dst, src) in buf.iter_mut().zip(bytes.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }

    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.write_cap.get());
        if n == 0 && !buf.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        self.outbound.bytes.borrow_mut().extend(buf[..n].iter().copied());
        Ok(n)
    }
}

/// Handles for the connection's registrations.
pub fn registrations(conn: &MemConnection) -> (Registration, Registration) {
    let (read, write) = conn.registrations().expect("connection is open");
    (
        Registration::new(read.id(), Interest::Read),
        Registration::new(write.id(), Interest::Write),
    )
}

/// Deliver one read notification if read interest is armed.
pub fn notify_read(conn: &mut MemConnection, events: &EventLoop) -> bool {
    let Some((read, _)) = conn.registrations() else {
        return false;
    };
    let read = Registration::new(read.id(), Interest::Read);
    if events.fire(&read) {
        conn.on_readable();
        true
    } else {
        false
    }
}

/// Deliver write notifications until write interest is disarmed.
///
/// Returns the number of notifications delivered.
pub fn flush(conn: &mut MemConnection, events: &EventLoop) -> usize {
    let mut delivered = 0;
    while let Some((_, write)) = conn.registrations() {
        let write = Registration::new(write.id(), Interest::Write);
        if !events.fire(&write) {
            break;
        }
        conn.on_writable();
        delivered += 1;
        assert!(delivered < 100_000, "writer never drained");
    }
    delivered
}

/// Deliver every notification that would fire on a real reactor until
/// neither connection makes progress.
pub fn pump(conns: &mut [&mut MemConnection], events: &EventLoop) {
    for _ in 0..10_000 {
        let mut progressed = false;
        for conn in conns.iter_mut() {
            if flush(conn, events) > 0 {
                progressed = true;
            }
            let readable = conn.socket().map(MemorySocket::is_readable).unwrap_or(false);
            if readable && notify_read(conn, events) {
                progressed = true;
            }
        }
        if !progressed {
            return;
        }
    }
    panic!("connections never went quiet");
}

/// Encode a frame as it appears on the wire.
pub fn wire_frame(frame_type: u8, flags: u8, stream_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Header::new(payload.len() as u32, frame_type, flags, stream_id)
        .encode()
        .to_vec();
    out.extend_from_slice(payload);
    out
}

/// Handler that keeps every frame it receives.
#[derive(Clone, Default)]
pub struct Recorder {
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl Recorder {
    pub fn frames(&self) -> std::cell::Ref<'_, Vec<Frame>> {
        self.frames.borrow()
    }
}

impl FrameHandler for Recorder {
    fn handle(&self, _ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult {
        self.frames.borrow_mut().push(frame);
        Ok(())
    }
}
