//! Reactor module - readiness registrations and non-blocking sockets.
//!
//! A [`Connection`](crate::Connection) never blocks. It performs one
//! non-blocking step per readiness notification and then re-arms the
//! registration it needs next:
//!
//! ```text
//! Reactor ──readable──► Connection::on_readable ──rearm(read)──► Reactor
//! Reactor ──writable──► Connection::on_writable ──rearm(write)─► Reactor
//! ```
//!
//! Registrations are one-shot: delivering a notification disarms the
//! registration until it is re-armed.

mod event_loop;

use std::io;
use std::rc::Rc;

pub use event_loop::{drive, EventLoop, Readiness};

/// Readiness a registration waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Read,
    Write,
}

/// Handle for one registered interest.
///
/// Not `Clone`: exactly one owner may unregister it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Registration {
    id: u64,
    interest: Interest,
}

impl Registration {
    /// Create a registration handle. Called by [`Reactor`] implementations.
    pub fn new(id: u64, interest: Interest) -> Self {
        Self { id, interest }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn interest(&self) -> Interest {
        self.interest
    }
}

/// Readiness reactor consumed by connections.
///
/// Methods take `&self` so that one reactor handle can be shared by every
/// connection it hosts.
pub trait Reactor {
    /// Register an interest. The registration starts disarmed.
    fn register(&self, interest: Interest) -> io::Result<Registration>;

    /// Arm (or re-arm) a registration for its next notification.
    fn rearm(&self, registration: &Registration) -> io::Result<()>;

    /// Disarm a registration without releasing it.
    fn disarm(&self, registration: &Registration);

    /// Release a registration. It will never fire again.
    fn unregister(&self, registration: Registration);
}

impl<R: Reactor + ?Sized> Reactor for &R {
    fn register(&self, interest: Interest) -> io::Result<Registration> {
        (**self).register(interest)
    }

    fn rearm(&self, registration: &Registration) -> io::Result<()> {
        (**self).rearm(registration)
    }

    fn disarm(&self, registration: &Registration) {
        (**self).disarm(registration)
    }

    fn unregister(&self, registration: Registration) {
        (**self).unregister(registration)
    }
}

impl<R: Reactor + ?Sized> Reactor for Rc<R> {
    fn register(&self, interest: Interest) -> io::Result<Registration> {
        (**self).register(interest)
    }

    fn rearm(&self, registration: &Registration) -> io::Result<()> {
        (**self).rearm(registration)
    }

    fn disarm(&self, registration: &Registration) {
        (**self).disarm(registration)
    }

    fn unregister(&self, registration: Registration) {
        (**self).unregister(registration)
    }
}

/// Non-blocking byte stream.
///
/// Both methods return `ErrorKind::WouldBlock` when the socket is not ready.
/// `try_read` returning `Ok(0)` for a non-empty buffer means the peer closed.
pub trait Socket {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize>;

    fn try_write(&self, buf: &[u8]) -> io::Result<usize>;
}

impl Socket for tokio::net::TcpStream {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        tokio::net::TcpStream::try_read(self, buf)
    }

    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        tokio::net::TcpStream::try_write(self, buf)
    }
}

#[cfg(unix)]
impl Socket for tokio::net::UnixStream {
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        tokio::net::UnixStream::try_read(self, buf)
    }

    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        tokio::net::UnixStream::try_write(self, buf)
    }
}
